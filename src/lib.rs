pub mod account;
pub mod config;
pub mod core;
pub mod databases;
pub mod functions;
pub mod harness;
pub mod id;
pub mod locale;
pub mod playground;
pub mod realtime;
pub mod storage;
pub mod teams;

use account::Account;
use config::ClientConfig;
use databases::Databases;
use functions::Functions;
use locale::Locale;
use realtime::Realtime;
use storage::Storage;
use teams::Teams;

/// Entry point for the service handles. All handles share one [`core::Client`] and
/// therefore one cookie jar.
#[derive(Clone)]
pub struct AppwriteApp {
    client: core::Client,
}

impl AppwriteApp {
    pub fn new(config: &ClientConfig) -> Result<Self, core::Error> {
        Ok(Self {
            client: core::Client::new(config)?,
        })
    }

    pub fn client(&self) -> &core::Client {
        &self.client
    }

    pub fn account(&self) -> Account {
        Account::new(self.client.clone())
    }

    pub fn databases(&self) -> Databases {
        Databases::new(self.client.clone())
    }

    pub fn storage(&self) -> Storage {
        Storage::new(self.client.clone())
    }

    pub fn functions(&self) -> Functions {
        Functions::new(self.client.clone())
    }

    pub fn teams(&self) -> Teams {
        Teams::new(self.client.clone())
    }

    pub fn locale(&self) -> Locale {
        Locale::new(self.client.clone())
    }

    pub fn realtime(&self) -> Realtime {
        Realtime::new(self.client.clone())
    }
}

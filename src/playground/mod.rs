//! The playground: every Appwrite action registered under its button label.
//!
//! [`Playground::new`] builds the catalogue against a fresh [`Session`]; [`Playground::start`]
//! initializes the session, checks connectivity, subscribes to realtime and prints the banner.
//! Labels are then run through [`Playground::invoke`].

mod account;
mod databases;
mod functions;
mod locale;
mod storage;
mod teams;
mod utilities;


use crate::config::{Fixtures, OAuthConfig, PlaygroundConfig};
use crate::harness::{
    render, ActionLog, ActionRegistry, Dispatcher, HarnessError, Outcome, RegistryBuilder,
    Services, Session,
};
use std::future::Future;
use std::sync::{Arc, Mutex};

pub const DEFAULT_EMAIL: &str = "playground@ma.com";
pub const DEFAULT_PASSWORD: &str = "playground123";
pub const DEFAULT_NAME: &str = "Playground User";

/// Redirect target for verification, recovery and membership emails.
pub(crate) const REDIRECT_URL: &str = "https://appwrite.io";

/// Channels the playground listens to after start-up.
pub const REALTIME_CHANNELS: [&str; 7] = [
    "files",
    "documents",
    "databases.*",
    "databases.*.collections.*.documents",
    "account",
    "teams",
    "memberships",
];

const BANNER: [&str; 4] = [
    "=== APPWRITE PLAYGROUND ===",
    "This playground demonstrates all major Appwrite SDK features.",
    "Set the database, collection, bucket and function ids in the config file or environment.",
    "Make sure the collections, buckets and functions exist in the Appwrite Console.",
];

/// User-editable inputs. A UI supplies its text fields; the CLI supplies flags.
pub trait InputSource: Send + Sync {
    fn email(&self) -> String;
    fn password(&self) -> String;
    fn name(&self) -> String;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticInputs {
    pub email: String,
    pub password: String,
    pub name: String,
}

impl Default for StaticInputs {
    fn default() -> Self {
        Self {
            email: DEFAULT_EMAIL.to_string(),
            password: DEFAULT_PASSWORD.to_string(),
            name: DEFAULT_NAME.to_string(),
        }
    }
}

impl InputSource for StaticInputs {
    fn email(&self) -> String {
        self.email.clone()
    }

    fn password(&self) -> String {
        self.password.clone()
    }

    fn name(&self) -> String {
        self.name.clone()
    }
}

pub struct PlaygroundOptions {
    pub config: PlaygroundConfig,
    pub inputs: Arc<dyn InputSource>,
    /// Ping the server during start-up.
    pub ping: bool,
    /// Subscribe to [`REALTIME_CHANNELS`] during start-up.
    pub realtime: bool,
    /// Reject a second concurrent run of the same action.
    pub single_flight: bool,
}

impl PlaygroundOptions {
    pub fn new(config: PlaygroundConfig) -> Self {
        Self {
            config,
            inputs: Arc::new(StaticInputs::default()),
            ping: true,
            realtime: true,
            single_flight: false,
        }
    }
}

/// Shared state handed to every action.
#[derive(Clone)]
pub(crate) struct Context {
    session: Arc<Session>,
    inputs: Arc<dyn InputSource>,
    fixtures: Arc<Fixtures>,
    oauth: Arc<OAuthConfig>,
    team_id: Arc<Mutex<Option<String>>>,
    output: Arc<ActionLog>,
    events: Arc<ActionLog>,
}

impl Context {
    pub(crate) fn services(&self) -> Result<&Services, HarnessError> {
        self.session.services().ok_or(HarnessError::NotReady)
    }

    fn fixture<'a>(value: &'a Option<String>, what: &str, var: &str) -> Result<&'a str, HarnessError> {
        value
            .as_deref()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| HarnessError::precondition(format!("No {what} configured. Set {var}!")))
    }

    pub(crate) fn database(&self) -> Result<(&str, &str), HarnessError> {
        Ok((
            Self::fixture(&self.fixtures.database_id, "database", crate::config::ENV_DATABASE_ID)?,
            Self::fixture(
                &self.fixtures.collection_id,
                "collection",
                crate::config::ENV_COLLECTION_ID,
            )?,
        ))
    }

    pub(crate) fn bucket(&self) -> Result<&str, HarnessError> {
        Self::fixture(&self.fixtures.bucket_id, "bucket", crate::config::ENV_BUCKET_ID)
    }

    pub(crate) fn function(&self) -> Result<&str, HarnessError> {
        Self::fixture(&self.fixtures.function_id, "function", crate::config::ENV_FUNCTION_ID)
    }

    /// Id captured by "Create Team".
    pub(crate) fn team_id(&self) -> Result<String, HarnessError> {
        self.team_id
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .ok_or_else(|| HarnessError::precondition("No team selected. Create one first!"))
    }

    pub(crate) fn set_team_id(&self, team_id: Option<String>) {
        *self.team_id.lock().unwrap_or_else(|e| e.into_inner()) = team_id;
    }
}

/// Registers `operation` with a fresh [`Context`] clone per run.
pub(crate) fn add<T, Op, Fut, Fmt>(
    builder: &mut RegistryBuilder,
    ctx: &Context,
    label: &str,
    operation: Op,
    formatter: Fmt,
) -> Result<(), HarnessError>
where
    T: Send + 'static,
    Op: Fn(Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, HarnessError>> + Send + 'static,
    Fmt: Fn(&T) -> Vec<String> + Send + Sync + 'static,
{
    let ctx = ctx.clone();
    builder.register(label, move || operation(ctx.clone()), formatter)?;
    Ok(())
}

fn catalogue(ctx: &Context) -> Result<ActionRegistry, HarnessError> {
    let mut builder = RegistryBuilder::new();
    builder.section("AUTH & ACCOUNT");
    account::register(&mut builder, ctx)?;
    builder.section("DATABASES");
    databases::register(&mut builder, ctx)?;
    builder.section("STORAGE");
    storage::register(&mut builder, ctx)?;
    builder.section("FUNCTIONS");
    functions::register(&mut builder, ctx)?;
    builder.section("TEAMS");
    teams::register(&mut builder, ctx)?;
    builder.section("LOCALE");
    locale::register(&mut builder, ctx)?;
    builder.section("REALTIME");
    utilities::register_realtime(&mut builder, ctx)?;
    builder.section("UTILITIES");
    utilities::register(&mut builder, ctx)?;
    Ok(builder.freeze())
}

pub struct Playground {
    dispatcher: Dispatcher,
    events: Arc<ActionLog>,
    config: PlaygroundConfig,
    ping: bool,
    realtime: bool,
}

impl Playground {
    pub fn new(options: PlaygroundOptions) -> Result<Self, HarnessError> {
        let PlaygroundOptions {
            config,
            inputs,
            ping,
            realtime,
            single_flight,
        } = options;

        let session = Arc::new(Session::new());
        let output = Arc::new(ActionLog::new("output", config.log.max_entries));
        let events = Arc::new(ActionLog::new("realtime", config.log.max_realtime_events));
        let ctx = Context {
            session: Arc::clone(&session),
            inputs,
            fixtures: Arc::new(config.fixtures.clone()),
            oauth: Arc::new(config.oauth.clone()),
            team_id: Arc::new(Mutex::new(None)),
            output: Arc::clone(&output),
            events: Arc::clone(&events),
        };

        let registry = Arc::new(catalogue(&ctx)?);
        let mut dispatcher = Dispatcher::new(registry, session, output);
        if single_flight {
            dispatcher = dispatcher.with_single_flight();
        }

        Ok(Self {
            dispatcher,
            events,
            config,
            ping,
            realtime,
        })
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn registry(&self) -> &ActionRegistry {
        self.dispatcher.registry()
    }

    pub fn session(&self) -> &Arc<Session> {
        self.dispatcher.session()
    }

    /// The main output log.
    pub fn output(&self) -> &Arc<ActionLog> {
        self.dispatcher.log()
    }

    /// Realtime event lines, newest last.
    pub fn events(&self) -> &Arc<ActionLog> {
        &self.events
    }

    pub fn status(&self) -> String {
        self.dispatcher.status()
    }

    /// Initializes the session and runs the start-up sequence.
    ///
    /// Ping and realtime problems are logged and do not fail start-up.
    pub async fn start(&self) -> Result<(), HarnessError> {
        let output = self.output();
        self.dispatcher.set_status("Initializing...");

        if let Err(err) = self.session().initialize(&self.config.client).await {
            output.error(render(&Outcome::from(&err)).join("\n"));
            self.dispatcher.set_status("Failed to initialize");
            return Err(err);
        }
        let services = self.session().services().ok_or(HarnessError::NotReady)?;

        if self.ping {
            match services.client.ping().await {
                Ok(pong) => output.info(format!("Connected to Appwrite: {pong}")),
                Err(err) => output.error(format!("Connection failed: {err}")),
            };
        }

        if self.realtime {
            let (out, events) = (Arc::clone(output), Arc::clone(&self.events));
            let subscribed = services
                .realtime
                .subscribe(&REALTIME_CHANNELS, move |event| {
                    let text = format!(
                        "[REALTIME] {}: {}",
                        event.first_event().unwrap_or_default(),
                        event.first_payload_key().unwrap_or_default()
                    );
                    out.info(text.clone());
                    events.info(text);
                })
                .await;
            match subscribed {
                Ok(subscription) => {
                    self.session().attach_subscription(subscription);
                    output.info("Realtime subscriptions active");
                }
                Err(err) => {
                    output.error(format!("Realtime setup failed: {err}"));
                }
            }
        }

        for line in BANNER {
            output.info(line);
        }
        self.dispatcher.set_status("Ready");
        Ok(())
    }

    pub async fn invoke(&self, label: &str) -> Outcome {
        self.dispatcher.invoke(label).await
    }

    /// Unsubscribes from realtime.
    pub fn shutdown(&self) {
        self.session().close();
    }
}

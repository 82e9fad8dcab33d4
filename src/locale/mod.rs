//! Locale service. Names are translated according to the client's `locale` setting.

pub mod models;

#[cfg(test)]
mod tests;

use crate::core::{Client, Error};
use models::{
    ContinentList, CountryList, CurrencyList, LanguageList, Locale as UserLocale, LocaleCodeList,
    PhoneList,
};

#[derive(Clone)]
pub struct Locale {
    client: Client,
}

impl Locale {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Gets the caller's location based on their IP address.
    pub async fn get(&self) -> Result<UserLocale, Error> {
        self.client.send(self.client.get("/locale"), "Get locale").await
    }

    pub async fn list_codes(&self) -> Result<LocaleCodeList, Error> {
        self.client
            .send(self.client.get("/locale/codes"), "List locale codes")
            .await
    }

    pub async fn list_continents(&self) -> Result<ContinentList, Error> {
        self.client
            .send(self.client.get("/locale/continents"), "List continents")
            .await
    }

    pub async fn list_countries(&self) -> Result<CountryList, Error> {
        self.client
            .send(self.client.get("/locale/countries"), "List countries")
            .await
    }

    /// Lists the European Union member states.
    pub async fn list_countries_eu(&self) -> Result<CountryList, Error> {
        self.client
            .send(self.client.get("/locale/countries/eu"), "List EU countries")
            .await
    }

    pub async fn list_countries_phones(&self) -> Result<PhoneList, Error> {
        self.client
            .send(self.client.get("/locale/countries/phones"), "List phone codes")
            .await
    }

    pub async fn list_currencies(&self) -> Result<CurrencyList, Error> {
        self.client
            .send(self.client.get("/locale/currencies"), "List currencies")
            .await
    }

    pub async fn list_languages(&self) -> Result<LanguageList, Error> {
        self.client
            .send(self.client.get("/locale/languages"), "List languages")
            .await
    }
}

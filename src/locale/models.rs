use serde::{Deserialize, Serialize};

/// Location of the caller, derived from their IP address.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Locale {
    pub ip: String,
    pub country_code: String,
    pub country: String,
    pub continent_code: String,
    pub continent: String,
    pub eu: bool,
    pub currency: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Country {
    pub name: String,
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CountryList {
    pub total: u64,
    pub countries: Vec<Country>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Continent {
    pub name: String,
    pub code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ContinentList {
    pub total: u64,
    pub continents: Vec<Continent>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Currency {
    pub symbol: String,
    pub name: String,
    pub symbol_native: String,
    pub decimal_digits: u32,
    pub rounding: f64,
    pub code: String,
    pub name_plural: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CurrencyList {
    pub total: u64,
    pub currencies: Vec<Currency>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Language {
    pub name: String,
    pub code: String,
    pub native_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LanguageList {
    pub total: u64,
    pub languages: Vec<Language>,
}

/// International dialing prefix of a country, e.g. `+1`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Phone {
    pub code: String,
    pub country_code: String,
    pub country_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PhoneList {
    pub total: u64,
    pub phones: Vec<Phone>,
}

/// ISO 639-1 / BCP 47 locale code with its display name.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LocaleCode {
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct LocaleCodeList {
    pub total: u64,
    pub locale_codes: Vec<LocaleCode>,
}

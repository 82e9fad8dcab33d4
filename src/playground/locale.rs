use super::{add, Context};
use crate::harness::{HarnessError, RegistryBuilder};
use crate::locale::models::{
    ContinentList, CountryList, CurrencyList, LanguageList, Locale, LocaleCodeList, PhoneList,
};

pub(super) fn register(builder: &mut RegistryBuilder, ctx: &Context) -> Result<(), HarnessError> {
    add(builder, ctx, "Get User Location", get_location, |l: &Locale| {
        vec![
            "User location:".to_string(),
            format!("  IP: {}", l.ip),
            format!("  Country: {} ({})", l.country, l.country_code),
            format!("  Continent: {} ({})", l.continent, l.continent_code),
            format!("  Currency: {}", l.currency),
            format!("  EU Member: {}", l.eu),
        ]
    })?;
    add(builder, ctx, "List Countries", list_countries, |list: &CountryList| {
        countries_summary(list, "countries")
    })?;
    add(builder, ctx, "List EU Countries", list_countries_eu, |list: &CountryList| {
        countries_summary(list, "EU countries")
    })?;
    add(builder, ctx, "List Continents", list_continents, |list: &ContinentList| {
        let mut lines = vec![format!("Found {} continents", list.total)];
        lines.extend(
            list.continents
                .iter()
                .map(|c| format!("  {} ({})", c.name, c.code)),
        );
        lines
    })?;
    add(builder, ctx, "List Currencies", list_currencies, |list: &CurrencyList| {
        let mut lines = vec![format!("Found {} currencies", list.total)];
        lines.extend(
            list.currencies
                .iter()
                .take(5)
                .map(|c| format!("  {} ({}) - {}", c.name, c.code, c.symbol)),
        );
        lines
    })?;
    add(builder, ctx, "List Languages", list_languages, |list: &LanguageList| {
        let mut lines = vec![format!("Found {} languages", list.total)];
        lines.extend(
            list.languages
                .iter()
                .take(5)
                .map(|l| format!("  {} ({})", l.name, l.code)),
        );
        lines
    })?;
    add(builder, ctx, "List Phone Codes", list_phones, |list: &PhoneList| {
        let mut lines = vec![format!("Found {} phone codes", list.total)];
        lines.extend(
            list.phones
                .iter()
                .take(5)
                .map(|p| format!("  {}: {}", p.country_name, p.code)),
        );
        lines
    })?;
    add(builder, ctx, "List Locale Codes", list_codes, |list: &LocaleCodeList| {
        let mut lines = vec![format!("Found {} locale codes", list.total)];
        lines.extend(
            list.locale_codes
                .iter()
                .take(5)
                .map(|c| format!("  {} ({})", c.name, c.code)),
        );
        lines
    })?;
    Ok(())
}

fn countries_summary(list: &CountryList, what: &str) -> Vec<String> {
    let mut lines = vec![format!("Found {} {what}", list.total)];
    lines.extend(
        list.countries
            .iter()
            .take(5)
            .map(|c| format!("  {} ({})", c.name, c.code)),
    );
    lines
}

async fn get_location(ctx: Context) -> Result<Locale, HarnessError> {
    Ok(ctx.services()?.locale.get().await?)
}

async fn list_countries(ctx: Context) -> Result<CountryList, HarnessError> {
    Ok(ctx.services()?.locale.list_countries().await?)
}

async fn list_countries_eu(ctx: Context) -> Result<CountryList, HarnessError> {
    Ok(ctx.services()?.locale.list_countries_eu().await?)
}

async fn list_continents(ctx: Context) -> Result<ContinentList, HarnessError> {
    Ok(ctx.services()?.locale.list_continents().await?)
}

async fn list_currencies(ctx: Context) -> Result<CurrencyList, HarnessError> {
    Ok(ctx.services()?.locale.list_currencies().await?)
}

async fn list_languages(ctx: Context) -> Result<LanguageList, HarnessError> {
    Ok(ctx.services()?.locale.list_languages().await?)
}

async fn list_phones(ctx: Context) -> Result<PhoneList, HarnessError> {
    Ok(ctx.services()?.locale.list_countries_phones().await?)
}

async fn list_codes(ctx: Context) -> Result<LocaleCodeList, HarnessError> {
    Ok(ctx.services()?.locale.list_codes().await?)
}

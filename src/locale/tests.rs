use super::*;
use crate::config::ClientConfig;
use httpmock::prelude::*;
use serde_json::json;

fn locale_for(server: &MockServer) -> Locale {
    let mut config = ClientConfig::new(server.url("/v1"), "test-project");
    config.locale = Some("de".to_string());
    Locale::new(Client::new(&config).unwrap())
}

#[tokio::test]
async fn test_get_locale_sends_locale_header() {
    let server = MockServer::start_async().await;
    let locale = locale_for(&server);

    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/v1/locale")
                .header("x-appwrite-locale", "de");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({
                    "ip": "127.0.0.1",
                    "countryCode": "DE",
                    "country": "Deutschland",
                    "continentCode": "EU",
                    "continent": "Europa",
                    "eu": true,
                    "currency": "EUR"
                }));
        })
        .await;

    let location = locale.get().await.unwrap();
    assert_eq!(location.country_code, "DE");
    assert!(location.eu);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_lists() {
    let server = MockServer::start_async().await;
    let locale = locale_for(&server);

    server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/locale/countries/phones");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({
                    "total": 1,
                    "phones": [{ "code": "+49", "countryCode": "DE", "countryName": "Germany" }]
                }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/locale/codes");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({
                    "total": 2,
                    "localeCodes": [
                        { "code": "en-us", "name": "English (United States)" },
                        { "code": "de", "name": "German" }
                    ]
                }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/locale/currencies");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({
                    "total": 1,
                    "currencies": [{
                        "symbol": "€",
                        "name": "Euro",
                        "symbolNative": "€",
                        "decimalDigits": 2,
                        "rounding": 0,
                        "code": "EUR",
                        "namePlural": "euros"
                    }]
                }));
        })
        .await;

    let phones = locale.list_countries_phones().await.unwrap();
    assert_eq!(phones.phones[0].code, "+49");

    let codes = locale.list_codes().await.unwrap();
    assert_eq!(codes.total, 2);
    assert_eq!(codes.locale_codes[1].code, "de");

    let currencies = locale.list_currencies().await.unwrap();
    assert_eq!(currencies.currencies[0].decimal_digits, 2);
}

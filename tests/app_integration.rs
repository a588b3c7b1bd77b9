use bitconv::core::{BitcoinConverter, ConvertError, Currency, RATE_UNAVAILABLE};
use bitconv::providers::CoindeskProvider;
use bitconv::providers::coindesk::CURRENT_PRICE_PATH;
use std::fs;
use std::time::Duration;
use tracing::info;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MOCK_RESPONSE_JSON: &str = r#"{"time": {"updated": "Oct 15, 2020 22:55:00 UTC","updatedISO": "2020-10-15T22:55:00+00:00","updateduk": "Oct 15, 2020 at 23:55 BST"},"chartName": "Bitcoin","bpi": {"USD": {"code": "USD","symbol": "&#36;","rate": "11,486.5341","description": "United States Dollar","rate_float": 11486.5341},"GBP": {"code": "GBP","symbol": "&pound;","rate": "8,900.8693","description": "British Pound Sterling","rate_float": 8900.8693},"EUR": {"code": "EUR","symbol": "&euro;","rate": "9,809.3278","description": "Euro","rate_float": 9809.3278}}}"#;

mod test_utils {
    use super::*;

    pub async fn create_mock_server(template: ResponseTemplate) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(CURRENT_PRICE_PATH))
            .respond_with(template)
            .mount(&mock_server)
            .await;

        mock_server
    }

    pub async fn healthy_index() -> MockServer {
        create_mock_server(ResponseTemplate::new(200).set_body_string(MOCK_RESPONSE_JSON)).await
    }

    pub fn converter_for(server: &MockServer) -> BitcoinConverter<CoindeskProvider> {
        let provider = CoindeskProvider::new(&server.uri(), Duration::from_secs(5))
            .expect("Failed to build provider");
        BitcoinConverter::new(provider)
    }

    pub fn write_config(server: &MockServer, currency: &str) -> tempfile::NamedTempFile {
        let config_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
        let config_content = format!(
            r#"
            currency: "{}"
            provider:
              base_url: {}
              timeout_secs: 5
        "#,
            currency,
            server.uri()
        );
        fs::write(config_file.path(), config_content).expect("Failed to write config file");
        config_file
    }
}

#[test_log::test(tokio::test)]
async fn test_exchange_rate_per_currency() {
    let mock_server = test_utils::healthy_index().await;
    let converter = test_utils::converter_for(&mock_server);

    for (currency, expected) in [
        (Currency::Usd, 11486.5341),
        (Currency::Gbp, 8900.8693),
        (Currency::Eur, 9809.3278),
    ] {
        let rate = converter.get_exchange_rate(currency).await;
        info!(%currency, rate, "Fetched rate");
        assert_eq!(rate, expected);
        assert_eq!(converter.exchange_rate(currency).await, Ok(expected));
    }
}

#[test_log::test(tokio::test)]
async fn test_convert_bitcoins_per_currency() {
    let mock_server = test_utils::healthy_index().await;
    let converter = test_utils::converter_for(&mock_server);

    let cases = [
        (Currency::Usd, 1.0, 11486.5341),
        (Currency::Usd, 2.0, 2.0 * 11486.5341),
        (Currency::Gbp, 1.0, 8900.8693),
        (Currency::Gbp, 2.0, 2.0 * 8900.8693),
        (Currency::Eur, 1.0, 9809.3278),
        (Currency::Eur, 2.0, 2.0 * 9809.3278),
    ];
    for (currency, coins, expected) in cases {
        let amount = converter.convert_bitcoins(currency, coins).await;
        assert_eq!(amount, Ok(expected), "{coins} BTC in {currency}");
    }
    assert_eq!(
        converter.convert_bitcoins(Currency::Usd, 2.0).await,
        Ok(22973.0682)
    );
}

#[test_log::test(tokio::test)]
async fn test_service_unavailable_returns_sentinel() {
    let mock_server = test_utils::create_mock_server(
        ResponseTemplate::new(503).set_body_string("not working"),
    )
    .await;
    let converter = test_utils::converter_for(&mock_server);

    assert_eq!(
        converter.get_exchange_rate(Currency::Usd).await,
        RATE_UNAVAILABLE
    );
    for coins in [0.0, 1.0, 5.0] {
        assert_eq!(
            converter.convert_bitcoins(Currency::Usd, coins).await,
            Ok(RATE_UNAVAILABLE)
        );
    }
    assert!(matches!(
        converter.convert(Currency::Usd, 5.0).await,
        Err(ConvertError::RateUnavailable(reason)) if reason.contains("503")
    ));
}

#[test_log::test(tokio::test)]
async fn test_unparsable_body_returns_sentinel() {
    let mock_server =
        test_utils::create_mock_server(ResponseTemplate::new(200).set_body_string("not working"))
            .await;
    let converter = test_utils::converter_for(&mock_server);

    assert_eq!(
        converter.get_exchange_rate(Currency::Eur).await,
        RATE_UNAVAILABLE
    );
    assert_eq!(
        converter.convert_bitcoins(Currency::Eur, 3.0).await,
        Ok(RATE_UNAVAILABLE)
    );
}

#[test_log::test(tokio::test)]
async fn test_negative_coins_makes_no_request() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(CURRENT_PRICE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(MOCK_RESPONSE_JSON))
        .expect(0)
        .mount(&mock_server)
        .await;
    let converter = test_utils::converter_for(&mock_server);

    for currency in Currency::ALL {
        let result = converter.convert_bitcoins(currency, -1.0).await;
        assert!(matches!(result, Err(ConvertError::InvalidArgument(_))));
    }
}

#[test_log::test(tokio::test)]
async fn test_repeated_calls_are_identical() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(CURRENT_PRICE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(MOCK_RESPONSE_JSON))
        .expect(4)
        .mount(&mock_server)
        .await;
    let converter = test_utils::converter_for(&mock_server);

    let first = converter.convert_bitcoins(Currency::Gbp, 2.0).await;
    let second = converter.convert_bitcoins(Currency::Gbp, 2.0).await;
    assert_eq!(first, second);
    assert_eq!(
        converter.get_exchange_rate(Currency::Eur).await,
        converter.get_exchange_rate(Currency::Eur).await
    );
}

#[test_log::test(tokio::test)]
async fn test_rates_are_rounded_to_four_places() {
    let body = r#"{"bpi": {"USD": {"rate": "11,486.534149"}}}"#;
    let mock_server =
        test_utils::create_mock_server(ResponseTemplate::new(200).set_body_string(body)).await;
    let converter = test_utils::converter_for(&mock_server);

    assert_eq!(converter.get_exchange_rate(Currency::Usd).await, 11486.5341);
    assert_eq!(
        converter.convert_bitcoins(Currency::Usd, 0.3).await,
        Ok(3445.9602)
    );
}

#[test_log::test(tokio::test)]
async fn test_full_app_flow_with_mock() {
    let mock_server = test_utils::healthy_index().await;
    let config_file = test_utils::write_config(&mock_server, "GBP");
    let config_path = config_file.path().to_str().unwrap();

    console::set_colors_enabled(false);

    let output = bitconv::execute(
        bitconv::AppCommand::Convert {
            coins: 2.0,
            currency: None,
        },
        Some(config_path),
    )
    .await
    .expect("Convert command failed");
    assert_eq!(output, "2 BTC = 17801.7386 GBP");

    let output = bitconv::execute(
        bitconv::AppCommand::Rate {
            currency: Some(Currency::Usd),
        },
        Some(config_path),
    )
    .await
    .expect("Rate command failed");
    assert_eq!(output, "1 BTC = 11486.5341 USD");

    let output = bitconv::execute(bitconv::AppCommand::Rates, Some(config_path))
        .await
        .expect("Rates command failed");
    assert!(output.contains("British Pound Sterling"));
    assert!(output.contains("9809.3278"));

    let result = bitconv::run_command(bitconv::AppCommand::Rates, Some(config_path)).await;
    assert!(result.is_ok(), "run_command failed with: {:?}", result.err());
}

#[test_log::test(tokio::test)]
async fn test_full_app_flow_with_negative_coins() {
    let mock_server = test_utils::healthy_index().await;
    let config_file = test_utils::write_config(&mock_server, "USD");

    let result = bitconv::run_command(
        bitconv::AppCommand::Convert {
            coins: -1.0,
            currency: None,
        },
        Some(config_file.path().to_str().unwrap()),
    )
    .await;

    let err = result.expect_err("Negative coins should fail");
    assert!(matches!(
        err.downcast_ref::<ConvertError>(),
        Some(ConvertError::InvalidArgument(_))
    ));
}

#[test_log::test(tokio::test)]
async fn test_full_app_flow_with_index_down() {
    let mock_server = test_utils::create_mock_server(ResponseTemplate::new(503)).await;
    let config_file = test_utils::write_config(&mock_server, "EUR");
    let config_path = config_file.path().to_str().unwrap();

    let output = bitconv::execute(
        bitconv::AppCommand::Convert {
            coins: 1.0,
            currency: None,
        },
        Some(config_path),
    )
    .await
    .expect("Unavailable rate is not an error");
    assert_eq!(output, "-1");

    let output = bitconv::execute(bitconv::AppCommand::Rates, Some(config_path))
        .await
        .expect("Unavailable index is not an error");
    assert!(output.contains("Price index unavailable"));
}

#[test_log::test(tokio::test)]
async fn test_missing_config_file_fails() {
    let result = bitconv::run_command(
        bitconv::AppCommand::Rates,
        Some("/nonexistent/bitconv/config.yaml"),
    )
    .await;
    assert!(result.is_err());
}

#[test_log::test(tokio::test)]
async fn test_malformed_sibling_currency_still_converts() {
    let body = r#"{"time": "now", "bpi": {"USD": {"rate": "11,486.5341"}, "GBP": {"rate": 8900.8693}}}"#;
    let mock_server =
        test_utils::create_mock_server(ResponseTemplate::new(200).set_body_string(body)).await;
    let converter = test_utils::converter_for(&mock_server);

    assert_eq!(converter.get_exchange_rate(Currency::Usd).await, 11486.5341);
    assert_eq!(
        converter.convert_bitcoins(Currency::Usd, 2.0).await,
        Ok(22973.0682)
    );
    assert_eq!(
        converter.get_exchange_rate(Currency::Gbp).await,
        RATE_UNAVAILABLE
    );
}

//! Setup statements issued while bringing a connection online.

use crate::config::ConnectionSettings;
use crate::error::InitStep;

/// Quotes a value as a SQL string literal, doubling embedded single quotes.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Quotes an identifier unless it is a plain bare word.
pub fn quote_identifier(name: &str) -> String {
    let mut chars = name.chars();
    let bare = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if bare {
        name.to_string()
    } else {
        format!("\"{}\"", name.replace('"', "\"\""))
    }
}

/// Returns the ordered setup statements, each tagged with its protocol step.
pub fn setup_plan(settings: &ConnectionSettings) -> Vec<(InitStep, String)> {
    let mut plan = Vec::new();

    for extension in &settings.extensions {
        let extension = quote_identifier(extension);
        plan.push((InitStep::ConfigureStorage, format!("INSTALL {extension};")));
        plan.push((InitStep::ConfigureStorage, format!("LOAD {extension};")));
    }

    let storage = [
        ("s3_endpoint", &settings.storage_endpoint),
        ("s3_access_key_id", &settings.access_key_id),
        ("s3_secret_access_key", &settings.secret_access_key),
        ("s3_region", &settings.region),
    ];
    for (name, value) in storage {
        plan.push((
            InitStep::ConfigureStorage,
            format!("SET {name}={};", quote_literal(value)),
        ));
    }

    plan.push((InitStep::RegisterSecret, create_secret(settings)));
    plan.push((InitStep::AttachCatalog, attach_catalog(settings)));
    plan
}

fn create_secret(settings: &ConnectionSettings) -> String {
    format!(
        "CREATE SECRET {} (TYPE iceberg, TOKEN {});",
        quote_identifier(&settings.secret_name),
        quote_literal(&settings.catalog_token)
    )
}

fn attach_catalog(settings: &ConnectionSettings) -> String {
    format!(
        "ATTACH {} AS {} (TYPE iceberg, SECRET {}, ENDPOINT {});",
        quote_literal(&settings.bucket),
        quote_identifier(&settings.alias),
        quote_identifier(&settings.secret_name),
        quote_literal(&settings.catalog_endpoint)
    )
}

// sieve/src/commands/expectations.rs
//
// USE CASE: List the expectation registry.

use comfy_table::{Table, presets::UTF8_FULL};
use sieve_core::domain::expectation::ExpectationKind;
use sieve_core::domain::expectation::naming::to_snake_case;

pub fn execute(category: Option<String>) -> anyhow::Result<()> {
    let wanted = category.map(|c| c.trim().to_lowercase());

    let entries: Vec<_> = ExpectationKind::catalog()
        .iter()
        .filter(|(_, cat)| wanted.as_deref().is_none_or(|w| cat.to_string() == w))
        .collect();

    if entries.is_empty() {
        anyhow::bail!(
            "❌ Unknown category '{}'\n👉 Use one of: schema, completeness, uniqueness, validity, numeric",
            wanted.unwrap_or_default()
        );
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Category", "Name", "Engine type"]);
    for (name, cat) in &entries {
        table.add_row(vec![cat.to_string(), name.to_string(), to_snake_case(name)]);
    }

    println!("{table}");
    println!("📚 {} expectation(s).", entries.len());
    Ok(())
}

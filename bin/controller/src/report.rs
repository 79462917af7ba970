//! Plain-text rendering of a snapshot for the binaries.

use alloy_primitives::Address;
use client::ReadField;
use config::UnitConvention;
use snapshot::{ContractSnapshot, FieldState, Freshness, ReadValue, Role};
use std::fmt::Write;
use validation::format_base_units;

/// One line per field, followed by the role and the actions it is offered.
pub fn render(
    snapshot: &ContractSnapshot,
    account: Option<Address>,
    role: Role,
    units: &UnitConvention,
) -> String {
    let mut out = String::new();

    let account = account.map_or_else(|| "not connected".to_string(), |a| a.to_string());
    let _ = writeln!(out, "account         {account}");

    for (field, state) in snapshot.fields() {
        let _ = writeln!(out, "{:<15} {}", field.as_str(), render_field(field, state, units));
    }

    let _ = writeln!(out, "role            {role}");
    let offered: Vec<&str> = role.offered_actions().iter().map(|k| k.as_str()).collect();
    let offered = if offered.is_empty() {
        "-".to_string()
    } else {
        offered.join(", ")
    };
    let _ = write!(out, "actions         {offered}");

    out
}

fn render_field(field: ReadField, state: &FieldState, units: &UnitConvention) -> String {
    let value = match state.value {
        Some(ReadValue::Uint(v)) => match field {
            ReadField::Rate => format_base_units(v, units.rate_decimals),
            ReadField::Tax => format_base_units(v, units.tax_decimals),
            ReadField::NativeBalance => format_base_units(v, units.native_decimals),
            ReadField::TokenBalance => format_base_units(v, units.token_decimals),
            _ => v.to_string(),
        },
        Some(ReadValue::Address(a)) => a.to_string(),
        Some(ReadValue::Bool(b)) => b.to_string(),
        None => "-".to_string(),
    };

    match (&state.freshness, &state.error) {
        (Freshness::Fresh, _) => value,
        (Freshness::Pending, _) => format!("{value} (loading)"),
        (Freshness::StaleAccountMismatch, _) => "- (loading for new account)".to_string(),
        (Freshness::Absent, _) => "- (no account)".to_string(),
        (Freshness::Failed, Some(error)) => format!("{value} (failed: {error})"),
        (Freshness::Failed, None) => format!("{value} (failed)"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::U256;
    use session::AccountState;
    use snapshot::ReadOutcome;
    use std::time::SystemTime;

    #[test]
    fn test_render() {
        let alice = Address::repeat_byte(0xaa);
        let active = AccountState {
            account: Some(alice),
            epoch: 1,
        };
        let mut snapshot = ContractSnapshot::new();
        let generation = snapshot.begin_refresh(active);

        let outcomes = [
            (
                ReadField::TokenBalance,
                Ok(ReadValue::Uint(U256::from(1_500_000_000_000_000_000u128))),
            ),
            (ReadField::Tax, Ok(ReadValue::Uint(U256::from(5)))),
            (ReadField::Rate, Err("timeout".to_string())),
        ];
        for (field, result) in outcomes {
            snapshot.apply(
                ReadOutcome {
                    field,
                    generation,
                    epoch: 1,
                    account: Some(alice),
                    fetched_at: SystemTime::now(),
                    result,
                },
                active,
            );
        }

        let text = render(&snapshot, Some(alice), Role::Whitelisted, &UnitConvention::standard());

        assert!(text.contains("tokenBalance    1.5\n"), "{text}");
        assert!(text.contains("tax             5\n"), "{text}");
        assert!(text.contains("rate            - (failed: timeout)"), "{text}");
        assert!(text.contains("owner           - (loading)"), "{text}");
        assert!(text.contains("isAdmin         - (loading for new account)"), "{text}");
        assert!(text.ends_with("actions         approve, getToken, getEth"), "{text}");
    }

    #[test]
    fn test_render_disconnected() {
        let text = render(&ContractSnapshot::new(), None, Role::None, &UnitConvention::standard());
        assert!(text.starts_with("account         not connected\n"));
        assert!(text.contains("isWhitelist     - (no account)"));
        assert!(text.ends_with("actions         -"));
    }
}

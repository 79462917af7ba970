//! Capability derived from a snapshot and the active account.

use crate::snapshot::ContractSnapshot;
use alloy_primitives::Address;
use client::ActionKind;
use std::fmt;

/// Caller role, ordered by privilege. Every role offers what the roles below
/// it offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Role {
    #[default]
    None,
    Whitelisted,
    Admin,
    Owner,
}

impl Role {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Whitelisted => "whitelisted",
            Self::Admin => "admin",
            Self::Owner => "owner",
        }
    }

    /// Whether a control for `kind` should be offered. The contract has the
    /// final say; an offered call can still revert.
    pub fn offers(self, kind: ActionKind) -> bool {
        self != Self::None && self >= required_role(kind)
    }

    pub fn offered_actions(self) -> Vec<ActionKind> {
        ActionKind::ALL
            .into_iter()
            .filter(|kind| self.offers(*kind))
            .collect()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lowest role a control for `kind` is offered to.
pub const fn required_role(kind: ActionKind) -> Role {
    match kind {
        ActionKind::Approve | ActionKind::GetToken | ActionKind::GetEth => Role::Whitelisted,
        ActionKind::Mint | ActionKind::Burn | ActionKind::Airdrop | ActionKind::SetWhitelist => {
            Role::Admin
        }
        ActionKind::SetAdmin
        | ActionKind::SetTax
        | ActionKind::SetTaxReceiver
        | ActionKind::SetRate => Role::Owner,
    }
}

/// Role of `account` according to `snapshot`.
///
/// Flags that were not fetched for exactly `account` count as false.
pub fn resolve(account: Option<Address>, snapshot: &ContractSnapshot) -> Role {
    let Some(account) = account else {
        return Role::None;
    };

    if snapshot.owner() == Some(account) {
        Role::Owner
    } else if snapshot.is_admin(account) == Some(true) {
        Role::Admin
    } else if snapshot.is_whitelist(account) == Some(true) {
        Role::Whitelisted
    } else {
        Role::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{ReadOutcome, ReadValue};
    use client::ReadField;
    use session::AccountState;
    use std::time::SystemTime;

    const OWNER: Address = Address::repeat_byte(0x11);
    const ALICE: Address = Address::repeat_byte(0xaa);
    const BOB: Address = Address::repeat_byte(0xbb);

    /// Snapshot bound to `account` with the given flags landed.
    fn snapshot_for(
        account: Address,
        owner: Option<Address>,
        admin: Option<bool>,
        whitelisted: Option<bool>,
    ) -> ContractSnapshot {
        let active = AccountState {
            account: Some(account),
            epoch: 1,
        };
        let mut snapshot = ContractSnapshot::new();
        let generation = snapshot.begin_refresh(active);

        let values = [
            (ReadField::Owner, owner.map(ReadValue::Address)),
            (ReadField::IsAdmin, admin.map(ReadValue::Bool)),
            (ReadField::IsWhitelist, whitelisted.map(ReadValue::Bool)),
        ];
        for (field, value) in values {
            if let Some(value) = value {
                snapshot.apply(
                    ReadOutcome {
                        field,
                        generation,
                        epoch: active.epoch,
                        account: active.account,
                        fetched_at: SystemTime::now(),
                        result: Ok(value),
                    },
                    active,
                );
            }
        }
        snapshot
    }

    #[test]
    fn test_resolve_table() {
        // (owner, isAdmin, isWhitelist) as seen for Alice
        let cases = [
            (Some(ALICE), Some(false), Some(false), Role::Owner),
            (Some(ALICE), Some(true), Some(true), Role::Owner),
            (Some(OWNER), Some(true), Some(true), Role::Admin),
            (Some(OWNER), Some(true), Some(false), Role::Admin),
            (Some(OWNER), Some(false), Some(true), Role::Whitelisted),
            (Some(OWNER), Some(false), Some(false), Role::None),
            (Some(OWNER), None, Some(true), Role::Whitelisted),
            (None, None, None, Role::None),
            (None, Some(true), None, Role::Admin),
        ];

        for (owner, admin, whitelisted, expected) in cases {
            let snapshot = snapshot_for(ALICE, owner, admin, whitelisted);
            assert_eq!(
                resolve(Some(ALICE), &snapshot),
                expected,
                "{owner:?} {admin:?} {whitelisted:?}"
            );
        }
    }

    #[test]
    fn test_no_account_is_none() {
        let snapshot = snapshot_for(OWNER, Some(OWNER), Some(true), Some(true));
        assert_eq!(resolve(None, &snapshot), Role::None);
    }

    #[test]
    fn test_flags_for_other_account_are_ignored() {
        let snapshot = snapshot_for(ALICE, Some(OWNER), Some(true), Some(true));
        assert_eq!(resolve(Some(ALICE), &snapshot), Role::Admin);
        assert_eq!(resolve(Some(BOB), &snapshot), Role::None);
        // Owner is contract-wide
        assert_eq!(resolve(Some(OWNER), &snapshot), Role::Owner);
    }

    #[test]
    fn test_capabilities_are_additive() {
        assert!(Role::None.offered_actions().is_empty());
        assert_eq!(
            Role::Whitelisted.offered_actions(),
            vec![ActionKind::Approve, ActionKind::GetToken, ActionKind::GetEth]
        );

        let roles = [Role::None, Role::Whitelisted, Role::Admin, Role::Owner];
        for pair in roles.windows(2) {
            let lower = pair[0].offered_actions();
            let higher = pair[1].offered_actions();
            assert!(lower.iter().all(|kind| higher.contains(kind)), "{}", pair[1]);
            assert!(higher.len() > lower.len());
        }
        assert_eq!(Role::Owner.offered_actions().len(), ActionKind::ALL.len());
    }

    #[test]
    fn test_required_roles() {
        assert!(Role::Admin.offers(ActionKind::Airdrop));
        assert!(!Role::Admin.offers(ActionKind::SetTax));
        assert!(Role::Owner.offers(ActionKind::SetRate));
        assert!(!Role::Whitelisted.offers(ActionKind::Mint));
        assert_eq!(required_role(ActionKind::SetWhitelist), Role::Admin);
    }
}

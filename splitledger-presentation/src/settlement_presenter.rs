use crate::{
    strings,
    text_table::{Alignment, TextTableBuilder},
};
use splitledger_application::{CrossScopeSettlement, MemberDirectory, ScopeSettlement};
use splitledger_domain::{Balance, MemberId, Money, Transfer};
use std::{borrow::Cow, fmt};

pub struct SettlementPresenter;

pub struct SettlementView {
    pub title: String,
    pub balance_table: Option<String>,
    pub transfer_table: Option<String>,
    pub notes: Vec<String>,
}

impl fmt::Display for SettlementView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        if let Some(balance_table) = &self.balance_table {
            write!(f, "\n{balance_table}")?;
        }
        match &self.transfer_table {
            Some(transfer_table) => write!(f, "\n{}\n{transfer_table}", strings::TRANSFERS)?,
            None => write!(f, "\n{}\n", strings::ALL_SETTLED)?,
        }
        for note in &self.notes {
            writeln!(f, "{note}")?;
        }
        Ok(())
    }
}

impl SettlementPresenter {
    pub fn render_scope(
        result: &ScopeSettlement,
        member_directory: &dyn MemberDirectory,
    ) -> SettlementView {
        let diagnostics = &result.diagnostics;
        let mut notes = Vec::new();
        if diagnostics.transfers_saved > 0 {
            notes.push(format!(
                "{} transfer(s) instead of {}.",
                result.transfers.len(),
                diagnostics.greedy_transfer_count
            ));
        }

        SettlementView {
            title: format!("{}: {}", strings::SCOPE, result.scope),
            balance_table: Some(Self::build_balance_table(&result.balances, member_directory)),
            transfer_table: Self::transfer_table(&result.transfers, member_directory),
            notes,
        }
    }

    pub fn render_across_scopes(
        result: &CrossScopeSettlement,
        member_directory: &dyn MemberDirectory,
    ) -> SettlementView {
        let scopes: Vec<&str> = result.scopes.iter().map(|scope| scope.as_str()).collect();
        SettlementView {
            title: format!("{} ({})", strings::ACROSS_SCOPES, scopes.join(", ")),
            balance_table: Some(Self::build_balance_table(&result.balances, member_directory)),
            transfer_table: Self::transfer_table(&result.transfers, member_directory),
            notes: vec![strings::PAIRWISE_NOTE.to_string()],
        }
    }

    /// What one participant still pays or receives across every scope.
    pub fn render_outstanding(
        member: &MemberId,
        transfers: &[Transfer],
        member_directory: &dyn MemberDirectory,
    ) -> SettlementView {
        let label = format_member_label(member, member_directory);
        let net: Money = transfers
            .iter()
            .map(|transfer| {
                if transfer.to == *member {
                    transfer.amount
                } else {
                    -transfer.amount
                }
            })
            .sum();

        let notes = if transfers.is_empty() {
            vec![strings::NOTHING_OUTSTANDING.to_string()]
        } else {
            vec![format!("{}: {}", strings::BALANCE, signed(net))]
        };

        SettlementView {
            title: format!("{} ({label})", strings::ACROSS_SCOPES),
            balance_table: None,
            transfer_table: Self::transfer_table(transfers, member_directory),
            notes,
        }
    }

    pub fn build_balance_table(
        balances: &[Balance],
        member_directory: &dyn MemberDirectory,
    ) -> String {
        let mut builder = TextTableBuilder::new()
            .alignments(&[
                Alignment::Left,
                Alignment::Right,
                Alignment::Right,
                Alignment::Right,
            ])
            .headers(&[
                Cow::Borrowed(strings::MEMBER),
                Cow::Borrowed(strings::PAID),
                Cow::Borrowed(strings::OWES),
                Cow::Borrowed(strings::BALANCE),
            ]);

        for balance in balances {
            builder = builder.row([
                format_member_label(&balance.member, member_directory),
                Cow::Owned(balance.paid.to_string()),
                Cow::Owned(balance.owes.to_string()),
                Cow::Owned(signed(balance.balance)),
            ]);
        }

        builder.build()
    }

    pub fn build_transfer_table(
        transfers: &[Transfer],
        member_directory: &dyn MemberDirectory,
    ) -> String {
        let mut builder = TextTableBuilder::new()
            .alignments(&[Alignment::Left, Alignment::Left, Alignment::Right])
            .headers(&[
                Cow::Borrowed(strings::FROM),
                Cow::Borrowed(strings::TO),
                Cow::Borrowed(strings::AMOUNT),
            ]);

        for transfer in transfers {
            builder = builder.row([
                format_member_label(&transfer.from, member_directory),
                format_member_label(&transfer.to, member_directory),
                Cow::Owned(transfer.amount.to_string()),
            ]);
        }

        builder.build()
    }

    fn transfer_table(
        transfers: &[Transfer],
        member_directory: &dyn MemberDirectory,
    ) -> Option<String> {
        (!transfers.is_empty()).then(|| Self::build_transfer_table(transfers, member_directory))
    }
}

fn signed(amount: Money) -> String {
    if amount.is_positive() {
        format!("+{amount}")
    } else {
        amount.to_string()
    }
}

fn format_member_label<'a>(
    member_id: &'a MemberId,
    member_directory: &'a dyn MemberDirectory,
) -> Cow<'a, str> {
    Cow::Borrowed(
        member_directory
            .display_name(member_id)
            .unwrap_or(member_id.as_str()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use smol_str::SmolStr;
    use splitledger_application::SettlementDiagnostics;
    use splitledger_domain::{Participant, ScopeId};
    use std::collections::HashMap;

    fn id(name: &str) -> MemberId {
        MemberId::new(name)
    }

    fn transfer(from: &str, to: &str, amount: i64) -> Transfer {
        Transfer {
            from: id(from),
            to: id(to),
            amount: Money::from_i64(amount),
        }
    }

    fn no_names() -> HashMap<MemberId, String> {
        HashMap::new()
    }

    fn sample_scope() -> ScopeSettlement {
        ScopeSettlement {
            scope: ScopeId::new("dinner"),
            balances: vec![
                Balance::new(id("a"), Money::from_i64(900), Money::from_i64(300)),
                Balance::new(id("b"), Money::ZERO, Money::from_i64(300)),
            ],
            transfers: vec![transfer("b", "a", 300)],
            diagnostics: SettlementDiagnostics {
                greedy_transfer_count: 2,
                optimized_transfer_count: 1,
                transfers_saved: 1,
            },
        }
    }

    #[test]
    fn render_uses_display_name_when_available() {
        let mut directory = no_names();
        directory.insert(id("a"), "Alice".to_string());

        let view = SettlementPresenter::render_scope(&sample_scope(), &directory);

        let balance_table = view.balance_table.as_ref().expect("balance table");
        assert!(balance_table.contains("Alice"));
        assert!(balance_table.contains("+600"));
        assert!(balance_table.contains("-300"));
        assert!(
            view.transfer_table
                .as_ref()
                .expect("transfer table")
                .contains("Alice")
        );
        assert_eq!(view.notes, vec!["1 transfer(s) instead of 2.".to_string()]);
    }

    #[test]
    fn render_falls_back_to_member_ids_when_missing() {
        let directory: IndexMap<MemberId, Participant> = IndexMap::new();

        let view = SettlementPresenter::render_scope(&sample_scope(), &directory);

        let transfers = view.transfer_table.expect("transfer table");
        assert!(
            transfers
                .lines()
                .any(|line| line.starts_with("b ") && line.ends_with("300"))
        );
    }

    #[test]
    fn settled_scope_says_so() {
        let result = ScopeSettlement {
            transfers: Vec::new(),
            diagnostics: SettlementDiagnostics {
                greedy_transfer_count: 0,
                optimized_transfer_count: 0,
                transfers_saved: 0,
            },
            ..sample_scope()
        };
        let view = SettlementPresenter::render_scope(&result, &no_names());

        assert!(view.transfer_table.is_none());
        let text = view.to_string();
        assert!(text.starts_with("Scope: dinner\n"));
        assert!(text.contains(strings::ALL_SETTLED));
    }

    #[test]
    fn across_scopes_lists_scope_names_and_note() {
        let result = CrossScopeSettlement {
            scopes: vec![ScopeId::new("trip"), ScopeId::new("flat")],
            balances: Vec::new(),
            transfers: vec![transfer("b", "a", 20)],
        };
        let mut directory = IndexMap::new();
        directory.insert(
            id("b"),
            Participant {
                id: id("b"),
                display_name: SmolStr::new("Bob"),
            },
        );

        let text = SettlementPresenter::render_across_scopes(&result, &directory).to_string();

        assert!(text.starts_with("Across scopes (trip, flat)\n"));
        assert!(text.contains("Bob"));
        assert!(text.contains(strings::PAIRWISE_NOTE));
    }

    #[test]
    fn outstanding_reports_net_position() {
        let transfers = [transfer("b", "a", 100), transfer("c", "b", 30)];
        let view =
            SettlementPresenter::render_outstanding(&id("b"), &transfers, &no_names());

        assert!(view.balance_table.is_none());
        assert_eq!(view.notes, vec!["Balance: -70".to_string()]);

        let empty = SettlementPresenter::render_outstanding(&id("z"), &[], &no_names());
        assert_eq!(empty.notes, vec![strings::NOTHING_OUTSTANDING.to_string()]);
    }
}

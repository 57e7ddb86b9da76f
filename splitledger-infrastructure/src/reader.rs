use fxhash::FxHashMap;
use indexmap::IndexMap;
use smol_str::SmolStr;
use splitledger_application::{Ledger, LedgerReader, LoadError};
use splitledger_domain::{
    ExpenseRecord, MemberId, Money, Participant, ScopeId, ScopeLedger, SettlementRecord,
    SettlementStatus, Split,
};
use splitledger_parser::{
    Expense, MemberDecl, ParseError, Settlement, SettlementState, Shares, Statement,
    StatementWithLine, parse_program,
};

/// Scope that collects records written before the first `scope` line.
pub const DEFAULT_SCOPE: &str = "default";

/// Reads the plain-text ledger format.
///
/// When the text declares at least one `member`, every name used by an
/// expense or settlement must be declared. Otherwise participants are
/// collected in first-seen order and named after their ids.
#[derive(Default)]
pub struct TextLedgerReader;

impl LedgerReader for TextLedgerReader {
    fn read(&self, content: &str) -> Result<Ledger, LoadError> {
        let program = parse_program(content).map_err(|err| match err {
            ParseError::SyntaxError { line, detail } => LoadError::SyntaxError { line, detail },
        })?;

        let declared = declared_members(&program.statements)?;
        let mut builder = LedgerBuilder::new(declared);

        for StatementWithLine { line, statement } in &program.statements {
            match statement {
                Statement::Member(_) => {}
                Statement::Scope(name) => builder.open_scope(name),
                Statement::Expense(expense) => builder.add_expense(expense, *line)?,
                Statement::Settlement(settlement) => builder.add_settlement(settlement, *line)?,
            }
        }

        let ledger = builder.finish();
        tracing::debug!(
            participant_count = ledger.participants.len(),
            scope_count = ledger.scopes.len(),
            statement_count = program.statements.len(),
            "Loaded ledger"
        );
        Ok(ledger)
    }
}

fn declared_members(
    statements: &[StatementWithLine<'_>],
) -> Result<IndexMap<MemberId, Participant>, LoadError> {
    let mut declared = IndexMap::new();
    for StatementWithLine { line, statement } in statements {
        let Statement::Member(MemberDecl { name, display_name }) = statement else {
            continue;
        };
        let id = MemberId::new(name);
        if declared.contains_key(&id) {
            return Err(LoadError::DuplicateMember {
                name: (*name).to_string(),
                line: *line,
            });
        }
        let display_name = (*display_name)
            .filter(|display| !display.trim().is_empty())
            .map_or_else(|| SmolStr::new(name), SmolStr::new);
        declared.insert(id.clone(), Participant { id, display_name });
    }
    Ok(declared)
}

struct LedgerBuilder {
    strict: bool,
    participants: IndexMap<MemberId, Participant>,
    scopes: Vec<ScopeLedger>,
    scope_index: FxHashMap<ScopeId, usize>,
    current: Option<usize>,
    // Sum of every expense total and settlement amount. Every balance,
    // pairwise debt and cross-scope total is bounded by it.
    volume: i64,
}

impl LedgerBuilder {
    fn new(declared: IndexMap<MemberId, Participant>) -> Self {
        Self {
            strict: !declared.is_empty(),
            participants: declared,
            scopes: Vec::new(),
            scope_index: FxHashMap::default(),
            current: None,
            volume: 0,
        }
    }

    // Reopening a scope appends to it.
    fn open_scope(&mut self, name: &str) {
        let index = self.scope_slot(ScopeId::new(name));
        self.current = Some(index);
    }

    fn scope_slot(&mut self, scope: ScopeId) -> usize {
        if let Some(&index) = self.scope_index.get(&scope) {
            return index;
        }
        let index = self.scopes.len();
        self.scope_index.insert(scope.clone(), index);
        self.scopes.push(ScopeLedger::new(scope));
        index
    }

    fn current_scope(&mut self) -> &mut ScopeLedger {
        let index = match self.current {
            Some(index) => index,
            None => {
                let index = self.scope_slot(ScopeId::new(DEFAULT_SCOPE));
                self.current = Some(index);
                index
            }
        };
        &mut self.scopes[index]
    }

    fn member(&mut self, name: &str, line: usize) -> Result<MemberId, LoadError> {
        let id = MemberId::new(name);
        if self.participants.contains_key(&id) {
            return Ok(id);
        }
        if self.strict {
            return Err(LoadError::UndefinedMember {
                name: name.to_string(),
                line,
            });
        }
        self.participants.insert(
            id.clone(),
            Participant {
                id: id.clone(),
                display_name: SmolStr::new(name),
            },
        );
        Ok(id)
    }

    fn add_expense(&mut self, expense: &Expense<'_>, line: usize) -> Result<(), LoadError> {
        let payer = self.member(expense.payer, line)?;
        let total = money(expense.amount, line)?;

        let record = match &expense.shares {
            Shares::Even(names) => {
                let members = names
                    .iter()
                    .map(|name| self.member(name, line))
                    .collect::<Result<Vec<_>, _>>()?;
                ExpenseRecord::even(payer, total, &members)
            }
            Shares::Explicit(shares) => {
                let share_sum = shares
                    .iter()
                    .try_fold(0u64, |sum, (_, amount)| sum.checked_add(*amount))
                    .ok_or(LoadError::AmountOverflow {
                        amount: expense.amount,
                        line,
                    })?;
                if share_sum != expense.amount {
                    return Err(LoadError::SplitTotalMismatch {
                        line,
                        total: expense.amount,
                        shares: share_sum,
                    });
                }
                let splits = shares
                    .iter()
                    .map(|(name, amount)| -> Result<Split, LoadError> {
                        Ok(Split {
                            member: self.member(name, line)?,
                            amount: money(*amount, line)?,
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                ExpenseRecord::new(payer, splits)
            }
        };

        self.add_volume(total, expense.amount, line)?;
        if record.total().is_zero() {
            tracing::warn!(line, payer = %record.payer, "Expense has a zero total");
        }
        self.current_scope().expenses.push(record);
        Ok(())
    }

    fn add_settlement(
        &mut self,
        settlement: &Settlement<'_>,
        line: usize,
    ) -> Result<(), LoadError> {
        let from = self.member(settlement.from, line)?;
        let to = self.member(settlement.to, line)?;
        if from == to {
            tracing::warn!(line, member = %from, "Settlement pays the same member it comes from");
        }
        let amount = money(settlement.amount, line)?;
        self.add_volume(amount, settlement.amount, line)?;
        let record = SettlementRecord {
            from,
            to,
            amount,
            status: settlement.state.map_or(SettlementStatus::Completed, status),
        };
        self.current_scope().settlements.push(record);
        Ok(())
    }

    fn add_volume(&mut self, amount: Money, raw: u64, line: usize) -> Result<(), LoadError> {
        self.volume = self
            .volume
            .checked_add(amount.amount())
            .ok_or(LoadError::AmountOverflow { amount: raw, line })?;
        Ok(())
    }

    fn finish(self) -> Ledger {
        Ledger {
            participants: self.participants,
            scopes: self.scopes,
        }
    }
}

fn money(amount: u64, line: usize) -> Result<Money, LoadError> {
    i64::try_from(amount)
        .map(Money::from_i64)
        .map_err(|_| LoadError::AmountOverflow { amount, line })
}

fn status(state: SettlementState) -> SettlementStatus {
    match state {
        SettlementState::Pending => SettlementStatus::Pending,
        SettlementState::Completed => SettlementStatus::Completed,
        SettlementState::Confirmed => SettlementStatus::Confirmed,
        SettlementState::Rejected => SettlementStatus::Rejected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn read(content: &str) -> Result<Ledger, LoadError> {
        TextLedgerReader.read(content)
    }

    fn splits(expense: &ExpenseRecord) -> Vec<(&str, i64)> {
        expense
            .splits
            .iter()
            .map(|split| (split.member.as_str(), split.amount.amount()))
            .collect()
    }

    #[test]
    fn reads_scopes_members_and_records() {
        let ledger = read(
            "\
member alice \"Alice Liddell\"
member bob
member carol \"Carol\"
scope tokyo-trip
alice paid 900 for alice, bob, carol
bob paid 500 for alice=200, bob=300
bob settled 300 to alice
carol settled 100 to alice (pending)
",
        )
        .expect("ledger should load");

        assert_eq!(
            ledger.member_ids(),
            vec![MemberId::new("alice"), MemberId::new("bob"), MemberId::new("carol")]
        );
        assert_eq!(
            ledger.participants[&MemberId::new("alice")].display_name,
            "Alice Liddell"
        );
        assert_eq!(ledger.participants[&MemberId::new("bob")].display_name, "bob");

        assert_eq!(ledger.scopes.len(), 1);
        let scope = &ledger.scopes[0];
        assert_eq!(scope.scope, ScopeId::new("tokyo-trip"));
        assert_eq!(
            splits(&scope.expenses[0]),
            vec![("alice", 300), ("bob", 300), ("carol", 300)]
        );
        assert_eq!(splits(&scope.expenses[1]), vec![("alice", 200), ("bob", 300)]);
        assert_eq!(scope.settlements[0].status, SettlementStatus::Completed);
        assert_eq!(scope.settlements[1].status, SettlementStatus::Pending);
    }

    #[test]
    fn records_before_first_scope_go_to_default() {
        let ledger = read("a paid 10 for b\nscope trip\nb paid 4 for a\nscope default\nc paid 1 for a")
            .expect("ledger should load");

        let names: Vec<&str> = ledger.scopes.iter().map(|s| s.scope.as_str()).collect();
        assert_eq!(names, vec![DEFAULT_SCOPE, "trip"]);
        assert_eq!(ledger.scopes[0].expenses.len(), 2);
        assert_eq!(ledger.scopes[1].expenses.len(), 1);
    }

    #[test]
    fn reopened_scope_appends() {
        let ledger = read("scope a\nx paid 1 for y\nscope b\nscope a\ny paid 2 for x")
            .expect("ledger should load");
        assert_eq!(ledger.scopes.len(), 2);
        assert_eq!(ledger.scope(&ScopeId::new("a")).map(|s| s.expenses.len()), Some(2));
        assert_eq!(ledger.scope(&ScopeId::new("b")).map(|s| s.expenses.len()), Some(0));
    }

    #[test]
    fn undeclared_ledger_collects_members_in_first_seen_order() {
        let ledger = read("carol paid 9 for bob, alice\nalice settled 3 to carol")
            .expect("ledger should load");
        assert_eq!(
            ledger.member_ids(),
            vec![MemberId::new("carol"), MemberId::new("bob"), MemberId::new("alice")]
        );
    }

    #[test]
    fn even_split_remainder_goes_to_first_members() {
        let ledger = read("a paid 100 for a, b, c").expect("ledger should load");
        assert_eq!(
            splits(&ledger.scopes[0].expenses[0]),
            vec![("a", 34), ("b", 33), ("c", 33)]
        );
    }

    #[rstest]
    #[case::undeclared_payer(
        "member a\nb paid 1 for a",
        LoadError::UndefinedMember { name: "b".to_string(), line: 2 }
    )]
    #[case::undeclared_share(
        "member a\na paid 1 for a, zed",
        LoadError::UndefinedMember { name: "zed".to_string(), line: 2 }
    )]
    #[case::undeclared_settlement(
        "a settled 1 to b\nmember a",
        LoadError::UndefinedMember { name: "b".to_string(), line: 1 }
    )]
    #[case::duplicate_member(
        "member a\nmember b\nmember a \"Again\"",
        LoadError::DuplicateMember { name: "a".to_string(), line: 3 }
    )]
    #[case::split_mismatch(
        "a paid 500 for a=200, b=200",
        LoadError::SplitTotalMismatch { line: 1, total: 500, shares: 400 }
    )]
    #[case::overflow(
        "a paid 9223372036854775808 for b",
        LoadError::AmountOverflow { amount: 9_223_372_036_854_775_808, line: 1 }
    )]
    #[case::running_total_overflow(
        "a paid 9223372036854775807 for b\na paid 9223372036854775807 for b",
        LoadError::AmountOverflow { amount: 9_223_372_036_854_775_807, line: 2 }
    )]
    #[case::settlement_total_overflow(
        "a paid 9223372036854775807 for b\nb settled 1 to a",
        LoadError::AmountOverflow { amount: 1, line: 2 }
    )]
    fn rejects_invalid_ledgers(#[case] content: &str, #[case] expected: LoadError) {
        assert_eq!(read(content), Err(expected));
    }

    #[test]
    fn syntax_errors_keep_their_line() {
        let err = read("a paid 1 for b\na pays 2 to b").expect_err("should fail");
        assert!(matches!(err, LoadError::SyntaxError { line: 2, .. }));
    }
}

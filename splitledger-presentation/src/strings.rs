pub const MEMBER: &str = "Member";
pub const PAID: &str = "Paid";
pub const OWES: &str = "Owes";
pub const BALANCE: &str = "Balance";
pub const FROM: &str = "From";
pub const TO: &str = "To";
pub const AMOUNT: &str = "Amount";

pub const SCOPE: &str = "Scope";
pub const ACROSS_SCOPES: &str = "Across scopes";
pub const TRANSFERS: &str = "Transfers";
pub const ALL_SETTLED: &str = "All settled.";
pub const NOTHING_OUTSTANDING: &str = "Nothing outstanding.";
pub const PAIRWISE_NOTE: &str =
    "Pairwise debts only; nobody is asked to pay someone they did not share costs with.";

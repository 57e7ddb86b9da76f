use crate::model::{MemberId, Money, Split};

/// Divides `total` into `count` integer shares that add up to `total` exactly.
///
/// Everyone gets `floor(total / count)`; the first `total mod count` shares
/// get one extra unit. Returns an empty vector when `count` is zero.
pub fn equal_split(total: Money, count: usize) -> Vec<Money> {
    if count == 0 {
        return Vec::new();
    }

    let divisor = count as i64;
    let base = total.amount().div_euclid(divisor);
    let remainder = total.amount().rem_euclid(divisor) as usize;

    (0..count)
        .map(|idx| {
            let share = if idx < remainder { base + 1 } else { base };
            Money::from_i64(share)
        })
        .collect()
}

/// [`equal_split`] paired with the members in the given order.
pub fn split_evenly(total: Money, members: &[MemberId]) -> Vec<Split> {
    equal_split(total, members.len())
        .into_iter()
        .zip(members)
        .map(|(amount, member)| Split {
            member: member.clone(),
            amount,
        })
        .collect()
}

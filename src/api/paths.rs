//! Endpoint paths, relative to the API base URL.
//!
//! The first segment of each path doubles as the cache key prefix for the
//! entity, so a mutation on `gyms/...` invalidates everything cached under `gyms`.

/// Gym collection
pub const GYMS: &str = "gyms";
/// Member collection
pub const MEMBERS: &str = "members";
/// Balance payment items (collection is nested under a member)
pub const BALANCE_PAYMENTS: &str = "balance-payments";
/// Diet template collection
pub const DIET_TEMPLATES: &str = "diet-templates";
/// Diet plan collection
pub const DIET_PLANS: &str = "diet-plans";
/// Subscription plan collection
pub const SUBSCRIPTION_PLANS: &str = "subscription-plans";
/// Expense collection
pub const EXPENSES: &str = "expenses";
/// Reports namespace
pub const REPORTS: &str = "reports";
/// PT membership collection
pub const PT_MEMBERSHIPS: &str = "pt-memberships";

/// `gyms/{id}`
#[must_use]
pub fn gym(id: &str) -> String {
    format!("{GYMS}/{id}")
}

/// `gyms/{id}/status`
#[must_use]
pub fn gym_status(id: &str) -> String {
    format!("{GYMS}/{id}/status")
}

/// `gyms/{id}/owner`
#[must_use]
pub fn gym_owner(id: &str) -> String {
    format!("{GYMS}/{id}/owner")
}

/// `gyms/{id}/logo`
#[must_use]
pub fn gym_logo(id: &str) -> String {
    format!("{GYMS}/{id}/logo")
}

/// `gyms/{id}/subscription/renew`
#[must_use]
pub fn gym_renew(id: &str) -> String {
    format!("{GYMS}/{id}/subscription/renew")
}

/// `gyms/{id}/subscription-history`
#[must_use]
pub fn gym_subscription_history(id: &str) -> String {
    format!("{GYMS}/{id}/subscription-history")
}

/// `members/{id}`
#[must_use]
pub fn member(id: &str) -> String {
    format!("{MEMBERS}/{id}")
}

/// `members/{id}/photo`
#[must_use]
pub fn member_photo(id: &str) -> String {
    format!("{MEMBERS}/{id}/photo")
}

/// `members/{id}/id-proof`
#[must_use]
pub fn member_id_proof(id: &str) -> String {
    format!("{MEMBERS}/{id}/id-proof")
}

/// `members/{id}/balance-payments`
#[must_use]
pub fn member_balance_payments(member_id: &str) -> String {
    format!("{MEMBERS}/{member_id}/{BALANCE_PAYMENTS}")
}

/// `members/{id}/diet-plans`
#[must_use]
pub fn member_diet_plans(member_id: &str) -> String {
    format!("{MEMBERS}/{member_id}/{DIET_PLANS}")
}

/// `balance-payments/{id}`
#[must_use]
pub fn balance_payment(id: &str) -> String {
    format!("{BALANCE_PAYMENTS}/{id}")
}

/// `diet-templates/{id}`
#[must_use]
pub fn diet_template(id: &str) -> String {
    format!("{DIET_TEMPLATES}/{id}")
}

/// `diet-templates/{id}/assign`
#[must_use]
pub fn diet_template_assign(id: &str) -> String {
    format!("{DIET_TEMPLATES}/{id}/assign")
}

/// `reports/expenses`
#[must_use]
pub fn expense_report() -> String {
    format!("{REPORTS}/{EXPENSES}")
}

/// Splits a path into cache key segments.
#[must_use]
pub fn segments(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(ToString::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_paths() {
        assert_eq!(member_balance_payments("m1"), "members/m1/balance-payments");
        assert_eq!(gym_renew("g1"), "gyms/g1/subscription/renew");
        assert_eq!(expense_report(), "reports/expenses");
    }

    #[test]
    fn test_segments_ignore_empty_parts() {
        assert_eq!(segments("/members//m1/balance-payments"), vec![
            "members",
            "m1",
            "balance-payments"
        ]);
    }
}

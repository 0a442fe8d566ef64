/// Club membership entries and list manipulation shared by every profile kind.
pub mod membership;
/// Role model and the single normalization boundary for legacy role shapes.
pub mod roles;
/// Scholarship status and the membership-year expiry rule.
pub mod scholarship;
/// Status values and the transition rules applied to users, clubs and
/// membership entries.
pub mod status;
/// Transfer request status machine.
pub mod transfer;

mod activity;
mod overview;

pub use activity::{Activity, ActivityRequest, Transaction};
pub use overview::{Card, Overview};

//! Query parameter types for API handlers.

use orderpulse_core::pagination::PageRequest;
use orderpulse_core::types::Timestamp;
use orderpulse_db::models::order::OrderFilter;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::AppError;

/// `?page=&pageSize=&fromDate=&toDate=&minAmount=&maxAmount=` for a
/// customer's order listing.
///
/// Paging values are normalised rather than rejected; see [`PageRequest`].
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderListParams {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub from_date: Option<Timestamp>,
    pub to_date: Option<Timestamp>,
    pub min_amount: Option<Decimal>,
    pub max_amount: Option<Decimal>,
}

impl OrderListParams {
    /// Split into the repository filter and page, rejecting inverted ranges.
    pub fn into_parts(self) -> Result<(OrderFilter, PageRequest), AppError> {
        if let (Some(from), Some(to)) = (self.from_date, self.to_date) {
            if from > to {
                return Err(AppError::BadRequest(
                    "fromDate must not be after toDate".into(),
                ));
            }
        }
        if let (Some(min), Some(max)) = (self.min_amount, self.max_amount) {
            if min > max {
                return Err(AppError::BadRequest(
                    "minAmount must not exceed maxAmount".into(),
                ));
            }
        }

        let page = PageRequest::new(self.page, self.page_size);
        let filter = OrderFilter {
            from_date: self.from_date,
            to_date: self.to_date,
            min_amount: self.min_amount,
            max_amount: self.max_amount,
        };
        Ok((filter, page))
    }
}

pub mod dashboard;
pub mod employee;
pub mod presence;
pub mod salary;
pub mod scanner;

use std::cmp::Ordering;
use std::future::Future;

use serde::{Deserialize, Serialize};
use tracing::warn;
use utoipa::{IntoParams, ToSchema};

use crate::{backend::BackendResult, error::AppError};

/// Where the data on a screen came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Backend,
    /// Demo data, the backend was unreachable.
    Fallback,
    /// The screen's own copy, the backend was unreachable.
    Local,
}

/// Position of a table page within the filtered rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct Paging {
    pub page: u64,
    pub per_page: u64,
    /// Rows matching the filter, over all pages.
    pub total: u64,
}

/// Body of every screen endpoint.
#[derive(Debug, Serialize)]
pub struct Screen<T> {
    pub data: T,
    pub source: DataSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
    #[serde(flatten)]
    pub paging: Option<Paging>,
}

impl<T> Screen<T> {
    pub fn backend(data: T) -> Self {
        Self {
            data,
            source: DataSource::Backend,
            notice: None,
            paging: None,
        }
    }

    pub fn fallback(data: T) -> Self {
        Self {
            data,
            source: DataSource::Fallback,
            notice: Some("Backend unreachable, showing demo data".to_string()),
            paging: None,
        }
    }

    pub fn local(data: T, notice: impl Into<String>) -> Self {
        Self {
            data,
            source: DataSource::Local,
            notice: Some(notice.into()),
            paging: None,
        }
    }

    /// One page of the table, keeping where the rows came from.
    pub fn page<U>(self, data: U, paging: Paging) -> Screen<U> {
        Screen {
            data,
            source: self.source,
            notice: self.notice,
            paging: Some(paging),
        }
    }
}

/// Runs a listing call, swapping in demo data when it fails.
pub async fn with_fallback<T, F>(screen: &str, call: F, fallback: impl FnOnce() -> T) -> Screen<T>
where
    F: Future<Output = BackendResult<T>>,
{
    match call.await {
        Ok(data) => Screen::backend(data),
        Err(e) => {
            warn!(error = %e, screen, "Backend call failed, showing demo data");
            Screen::fallback(fallback())
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Comparison behind one sortable column.
pub type ColumnOrder<T> = fn(&T, &T) -> Ordering;

/// Table controls: free-text filter, sort column and page.
///
/// The filter is trimmed and case-insensitive like the data-table one.
/// Paging applies to the filtered rows, so a new filter lands on page 1.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TableQuery {
    /// Matches any displayed column
    pub filter: Option<String>,
    /// Page number, starting at 1
    pub page: Option<u64>,
    /// Rows per page, 10 by default and at most 100
    pub per_page: Option<u64>,
    /// Column to sort by, using its wire name
    pub sort: Option<String>,
    /// asc or desc
    #[param(inline)]
    pub direction: Option<SortDirection>,
}

impl TableQuery {
    pub fn needle(&self) -> Option<String> {
        self.filter
            .as_deref()
            .map(|f| f.trim().to_lowercase())
            .filter(|f| !f.is_empty())
    }

    /// Sorts the filtered rows by the requested column and cuts out the
    /// requested page. `column` maps a wire name to its comparison.
    pub fn arrange<T>(
        &self,
        mut rows: Vec<T>,
        column: impl Fn(&str) -> Option<ColumnOrder<T>>,
    ) -> Result<(Vec<T>, Paging), AppError> {
        if let Some(sort) = self.sort.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let order = column(sort)
                .ok_or_else(|| AppError::BadRequest(format!("Cannot sort by {sort}")))?;
            match self.direction.unwrap_or_default() {
                SortDirection::Asc => rows.sort_by(order),
                SortDirection::Desc => rows.sort_by(|a, b| order(b, a)),
            }
        }

        let per_page = self.per_page.unwrap_or(10).clamp(1, 100);
        let page = self.page.unwrap_or(1).max(1);
        let offset = (page - 1).saturating_mul(per_page);
        let total = rows.len() as u64;

        let rows = rows
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(per_page as usize)
            .collect();
        Ok((
            rows,
            Paging {
                page,
                per_page,
                total,
            },
        ))
    }
}

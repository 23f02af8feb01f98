//! Paging, sorting and the paginated response envelope

use crate::core::entity::SupportTicket;
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Page size used when the request does not name one
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Largest page size a request may ask for
pub const MAX_PAGE_SIZE: usize = 100;

/// Fields a listing can be ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Id,
    TicketNumber,
    RequesterName,
    Status,
    Priority,
    Category,
    EstimatedCost,
    Currency,
    CreatedAt,
    DueDate,
}

impl SortField {
    pub const ALL: &'static [SortField] = &[
        SortField::Id,
        SortField::TicketNumber,
        SortField::RequesterName,
        SortField::Status,
        SortField::Priority,
        SortField::Category,
        SortField::EstimatedCost,
        SortField::Currency,
        SortField::CreatedAt,
        SortField::DueDate,
    ];

    /// JSON property name
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::TicketNumber => "ticketNumber",
            SortField::RequesterName => "requesterName",
            SortField::Status => "status",
            SortField::Priority => "priority",
            SortField::Category => "category",
            SortField::EstimatedCost => "estimatedCost",
            SortField::Currency => "currency",
            SortField::CreatedAt => "createdAt",
            SortField::DueDate => "dueDate",
        }
    }

    /// Column name in relational stores
    pub fn column(&self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::TicketNumber => "ticket_number",
            SortField::RequesterName => "requester_name",
            SortField::Status => "status",
            SortField::Priority => "priority",
            SortField::Category => "category",
            SortField::EstimatedCost => "estimated_cost",
            SortField::Currency => "currency",
            SortField::CreatedAt => "created_at",
            SortField::DueDate => "due_date",
        }
    }

    /// Compare two tickets on this field alone
    ///
    /// Enumerations compare by their stored name so that every backend agrees.
    pub fn compare(&self, a: &SupportTicket, b: &SupportTicket) -> Ordering {
        match self {
            SortField::Id => a.id.cmp(&b.id),
            SortField::TicketNumber => a.ticket_number.cmp(&b.ticket_number),
            SortField::RequesterName => a.requester_name.cmp(&b.requester_name),
            SortField::Status => a.status.as_str().cmp(b.status.as_str()),
            SortField::Priority => a.priority.as_str().cmp(b.priority.as_str()),
            SortField::Category => a.category.cmp(&b.category),
            SortField::EstimatedCost => a.estimated_cost.cmp(&b.estimated_cost),
            SortField::Currency => a.currency.as_str().cmp(b.currency.as_str()),
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::DueDate => a.due_date.cmp(&b.due_date),
        }
    }
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortField::ALL
            .iter()
            .copied()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| {
                let names: Vec<_> = SortField::ALL.iter().map(|f| f.as_str()).collect();
                format!("unknown sort field '{}', expected one of {}", s, names.join(", "))
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(format!(
                "unknown sort direction '{}', expected asc or desc",
                other
            )),
        }
    }
}

/// Sort order of a listing
///
/// Ties on the sort field are always broken by ascending `id`, so paging is
/// deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Sort {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    pub fn compare(&self, a: &SupportTicket, b: &SupportTicket) -> Ordering {
        let primary = match self.direction {
            SortDirection::Asc => self.field.compare(a, b),
            SortDirection::Desc => self.field.compare(b, a),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }
}

impl Default for Sort {
    fn default() -> Self {
        Self::new(SortField::CreatedAt, SortDirection::Asc)
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.field.as_str(), self.direction.as_str())
    }
}

/// Parses `field` or `field,asc|desc`
impl FromStr for Sort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(2, ',');
        let field = parts.next().unwrap_or_default().trim().parse::<SortField>()?;
        let direction = match parts.next().map(str::trim) {
            None | Some("") => SortDirection::Asc,
            Some(dir) => dir.parse()?,
        };
        Ok(Sort::new(field, direction))
    }
}

/// Which slice of the ordered result to return
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 0-based page index
    pub page: usize,
    pub size: usize,
    pub sort: Sort,
}

impl PageRequest {
    pub fn new(page: usize, size: usize, sort: Sort) -> Self {
        Self { page, size, sort }
    }

    pub fn of(page: usize, size: usize) -> Self {
        Self::new(page, size, Sort::default())
    }

    /// Number of matching tickets that precede this page
    pub fn offset(&self) -> usize {
        self.page.saturating_mul(self.size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::of(0, DEFAULT_PAGE_SIZE)
    }
}

/// Paginated response structure
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, request: &PageRequest, total: u64) -> Self {
        Self {
            data,
            pagination: PaginationMeta::new(request, total),
        }
    }
}

/// Pagination metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    /// Current page index (starts at 0)
    pub page: usize,
    pub size: usize,
    /// Total number of tickets matching the filter
    pub total: u64,
    pub total_pages: u64,
    pub has_next: bool,
    pub has_prev: bool,
    /// Applied sort, as `field,direction`
    pub sort: String,
}

impl PaginationMeta {
    pub fn new(request: &PageRequest, total: u64) -> Self {
        // Ensure size is at least 1 to avoid division by zero
        let size = request.size.max(1) as u64;
        let total_pages = total.div_ceil(size);
        let page = request.page as u64;

        Self {
            page: request.page,
            size: request.size,
            total,
            total_pages,
            has_next: page.saturating_add(1) < total_pages,
            has_prev: page > 0,
            sort: request.sort.to_string(),
        }
    }
}

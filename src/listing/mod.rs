//! Paging, sorting and filtering state for the admin tables.
//!
//! One sort key is active at a time. Clicking the active column flips its
//! direction; clicking another column starts it ascending.

use serde::{Deserialize, Serialize};

use crate::models::Page;

const DEFAULT_LIMIT: u32 = 10;
const MAX_LIMIT: u32 = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn flipped(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// A column a table can be sorted by.
pub trait SortColumn: Copy + Eq + Serialize + 'static {
    /// Every sortable column, in header order.
    const ALL: &'static [Self];

    /// Name the backend expects in `sortBy`.
    fn as_str(&self) -> &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SortState<C> {
    pub column: C,
    pub order: SortOrder,
}

impl<C: SortColumn> SortState<C> {
    pub fn new(column: C, order: SortOrder) -> Self {
        Self { column, order }
    }

    /// State after clicking the header of `column`.
    pub fn toggle(self, column: C) -> Self {
        if self.column == column {
            Self {
                column,
                order: self.order.flipped(),
            }
        } else {
            Self {
                column,
                order: SortOrder::Asc,
            }
        }
    }

    /// Header descriptors, each carrying the state its click leads to.
    pub fn headers(&self) -> Vec<SortHeader<C>> {
        C::ALL
            .iter()
            .map(|&column| SortHeader {
                column,
                active: column == self.column,
                order: (column == self.column).then_some(self.order),
                next: self.toggle(column),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SortHeader<C> {
    pub column: C,
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<SortOrder>,
    pub next: SortState<C>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InscriptionColumn {
    Nombre,
    Apellido,
    Email,
    CourseTitle,
    PaymentStatus,
    FechaInscripcion,
}

impl SortColumn for InscriptionColumn {
    const ALL: &'static [Self] = &[
        InscriptionColumn::Nombre,
        InscriptionColumn::Apellido,
        InscriptionColumn::Email,
        InscriptionColumn::CourseTitle,
        InscriptionColumn::PaymentStatus,
        InscriptionColumn::FechaInscripcion,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            InscriptionColumn::Nombre => "nombre",
            InscriptionColumn::Apellido => "apellido",
            InscriptionColumn::Email => "email",
            InscriptionColumn::CourseTitle => "courseTitle",
            InscriptionColumn::PaymentStatus => "paymentStatus",
            InscriptionColumn::FechaInscripcion => "fechaInscripcion",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CourseColumn {
    Title,
    Price,
    Category,
    CreatedAt,
}

impl SortColumn for CourseColumn {
    const ALL: &'static [Self] = &[
        CourseColumn::Title,
        CourseColumn::Price,
        CourseColumn::Category,
        CourseColumn::CreatedAt,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            CourseColumn::Title => "title",
            CourseColumn::Price => "price",
            CourseColumn::Category => "category",
            CourseColumn::CreatedAt => "createdAt",
        }
    }
}

/// Payment-status filter of the inscriptions table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentFilter {
    #[default]
    All,
    Paid,
    Pending,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Xlsx,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
        }
    }
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

fn clean(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Query parameters of the inscriptions table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InscriptionQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default, alias = "q")]
    pub search: Option<String>,
    #[serde(default)]
    pub payment_status: PaymentFilter,
    #[serde(default)]
    pub turno_id: Option<String>,
    #[serde(default)]
    pub course_id: Option<String>,
    #[serde(default)]
    pub sort_by: Option<InscriptionColumn>,
    #[serde(default)]
    pub sort_order: Option<SortOrder>,
}

impl Default for InscriptionQuery {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
            search: None,
            payment_status: PaymentFilter::All,
            turno_id: None,
            course_id: None,
            sort_by: None,
            sort_order: None,
        }
    }
}

impl InscriptionQuery {
    /// Newest inscriptions first unless a column was picked.
    pub fn sort(&self) -> SortState<InscriptionColumn> {
        match self.sort_by {
            Some(column) => SortState::new(column, self.sort_order.unwrap_or_default()),
            None => SortState::new(InscriptionColumn::FechaInscripcion, SortOrder::Desc),
        }
    }

    /// Filter-only parameters, shared by listing and export.
    pub fn filter_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(search) = clean(&self.search) {
            params.push(("search", search));
        }
        match self.payment_status {
            PaymentFilter::All => {}
            PaymentFilter::Paid => params.push(("paymentStatus", "paid".to_string())),
            PaymentFilter::Pending => params.push(("paymentStatus", "pending".to_string())),
        }
        if let Some(turno) = clean(&self.turno_id) {
            params.push(("turnoId", turno));
        }
        if let Some(course) = clean(&self.course_id) {
            params.push(("courseId", course));
        }
        params
    }

    /// Full backend parameter list: paging, sort and filters.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let sort = self.sort();
        let mut params = vec![
            ("page", self.page.max(1).to_string()),
            ("limit", self.limit.clamp(1, MAX_LIMIT).to_string()),
            ("sortBy", sort.column.as_str().to_string()),
            ("sortOrder", sort.order.as_str().to_string()),
        ];
        params.extend(self.filter_params());
        params
    }
}

/// Query parameters of the admin course list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub sort_by: Option<CourseColumn>,
    #[serde(default)]
    pub sort_order: Option<SortOrder>,
}

impl CourseQuery {
    pub fn sort(&self) -> SortState<CourseColumn> {
        SortState::new(
            self.sort_by.unwrap_or(CourseColumn::Title),
            self.sort_order.unwrap_or_default(),
        )
    }

    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let sort = self.sort();
        let mut params = vec![
            ("page", self.page.max(1).to_string()),
            ("limit", self.limit.clamp(1, MAX_LIMIT).to_string()),
            ("sortBy", sort.column.as_str().to_string()),
            ("sortOrder", sort.order.as_str().to_string()),
        ];
        if let Some(search) = clean(&self.search) {
            params.push(("search", search));
        }
        params
    }
}

/// A page of rows plus the sort state the table was built with.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableView<T, C> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub total_pages: u32,
    pub sort: SortState<C>,
    pub headers: Vec<SortHeader<C>>,
}

impl<T, C: SortColumn> TableView<T, C> {
    pub fn new(page: Page<T>, sort: SortState<C>, limit: u32) -> Self {
        let limit = u64::from(limit.clamp(1, MAX_LIMIT));
        // Older backend versions omit totalPages.
        let total_pages = if page.total_pages > 0 {
            page.total_pages
        } else {
            u32::try_from(page.total.div_ceil(limit)).unwrap_or(u32::MAX)
        };
        Self {
            items: page.items,
            total: page.total,
            page: page.page,
            total_pages,
            headers: sort.headers(),
            sort,
        }
    }
}

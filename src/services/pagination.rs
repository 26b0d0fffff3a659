//! Uniform list-response envelope.
//!
//! `paginate` never queries or slices storage: callers fetch one page with
//! `Pagination::offset()` / `Pagination::limit()` and pass the full match count
//! alongside it. Each record is converted through `IntoPublic`, which is where
//! internal storage identifiers are dropped.
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, de};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

/// Conversion from a storage record to its externally visible form.
///
/// Implementations must drop the backing store's primary key and keep every
/// other field as-is.
pub trait IntoPublic {
    type Public;

    fn into_public(self) -> Self::Public;
}

/// Caller-supplied `?page=&limit=`. Both optional.
///
/// Query values are read leniently (see `lenient_int`), so `?page=` or
/// `?limit=abc` fall back to the defaults instead of rejecting the request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct PaginationOptions {
    #[serde(default, deserialize_with = "lenient_int")]
    pub page: Option<i64>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub limit: Option<i64>,
}

/// Leading-integer parse: `" 12abc"` → 12, `"2.5"` → 2, `""` / `"abc"` → None.
/// Overflow saturates.
pub fn parse_leading_int(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    let value = digits[..end].bytes().fold(0i64, |acc, b| {
        acc.saturating_mul(10).saturating_add(i64::from(b - b'0'))
    });

    Some(if negative { -value } else { value })
}

/// serde adapter for optional integer query params that never fails on bad input.
pub fn lenient_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    struct LenientInt;

    impl<'de> de::Visitor<'de> for LenientInt {
        type Value = Option<i64>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("an integer or a string")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(parse_leading_int(v))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
            Ok(Some(v))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
            Ok(Some(i64::try_from(v).unwrap_or(i64::MAX)))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
            // NaN → None; `as` saturates
            Ok((!v.is_nan()).then(|| v.trunc() as i64))
        }

        fn visit_bool<E: de::Error>(self, _: bool) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D2: Deserializer<'de>>(self, d: D2) -> Result<Self::Value, D2::Error> {
            d.deserialize_any(LenientInt)
        }
    }

    deserializer.deserialize_any(LenientInt)
}

impl PaginationOptions {
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        Self { page, limit }
    }

    /// Absent or non-positive values fall back to the defaults; `limit` is capped
    /// at `MAX_LIMIT`.
    pub fn resolve(&self) -> Pagination {
        let page = self
            .page
            .filter(|p| *p >= 1)
            .map_or(DEFAULT_PAGE, |p| u32::try_from(p).unwrap_or(u32::MAX));

        let limit = self
            .limit
            .filter(|l| *l >= 1)
            .map_or(DEFAULT_LIMIT, |l| {
                u32::try_from(l).unwrap_or(MAX_LIMIT).min(MAX_LIMIT)
            });

        Pagination { page, limit }
    }
}

/// Normalised page/limit; `page >= 1` and `1 <= limit <= MAX_LIMIT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: u32,
    limit: u32,
}

impl Pagination {
    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Row offset of the first record on this page.
    pub fn offset(&self) -> i64 {
        (i64::from(self.page) - 1) * i64::from(self.limit)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl From<PaginationOptions> for Pagination {
    fn from(options: PaginationOptions) -> Self {
        options.resolve()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResult<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u64,
}

pub fn paginate<T, P>(items: Vec<T>, total: u64, pagination: P) -> PaginatedResult<T::Public>
where
    T: IntoPublic,
    P: Into<Pagination>,
{
    let Pagination { page, limit } = pagination.into();

    PaginatedResult {
        data: items.into_iter().map(IntoPublic::into_public).collect(),
        total,
        page,
        limit,
        total_pages: total.div_ceil(u64::from(limit)),
    }
}

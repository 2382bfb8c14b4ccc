//! Records, pages and the artworks API payload.
//!
//! The selection tracker only ever looks at a record's id, expressed through the
//! [`Identified`] trait. [`Artwork`] is the concrete record served by the Art
//! Institute of Chicago API; its display fields are opaque to everything but the
//! table widget.

use serde::{Deserialize, Serialize};

/// Identifier of a record in the remote collection.
pub type RecordId = u64;

/// Placeholder rendered for empty or missing cells.
pub const EMPTY_CELL: &str = "N/A";

/// Anything that can be keyed by a [`RecordId`].
///
/// `RecordId` itself implements the trait, so selection edits can be expressed
/// either as records or as bare ids:
///
/// ```rust
/// use artworks_table::artwork::{Identified, RecordId};
///
/// let id: RecordId = 42;
/// assert_eq!(id.id(), 42);
/// ```
pub trait Identified {
    /// The record's unique id.
    fn id(&self) -> RecordId;
}

impl Identified for RecordId {
    fn id(&self) -> RecordId {
        *self
    }
}

impl<T: Identified + ?Sized> Identified for &T {
    fn id(&self) -> RecordId {
        (**self).id()
    }
}

/// One `page_size`-bounded slice of the remote collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<R> {
    /// 1-based page number this slice was requested as.
    pub number: usize,
    /// Requested page size. The last page may hold fewer records.
    pub size: usize,
    /// Records on this page, in the collection's natural order.
    pub records: Vec<R>,
    /// Number of records in the whole remote collection.
    pub total_count: usize,
}

impl<R> Page<R> {
    /// Creates a page.
    pub fn new(number: usize, size: usize, records: Vec<R>, total_count: usize) -> Self {
        Self {
            number,
            size,
            records,
            total_count,
        }
    }

    /// Returns true if the page holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<R: Identified> Page<R> {
    /// Ids of the records on this page, in page order.
    pub fn ids(&self) -> Vec<RecordId> {
        self.records.iter().map(Identified::id).collect()
    }
}

/// An artwork as returned by `GET /api/v1/artworks`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artwork {
    /// Collection id.
    pub id: RecordId,
    /// Title of the work.
    #[serde(default)]
    pub title: Option<String>,
    /// Where the work was made.
    #[serde(default)]
    pub place_of_origin: Option<String>,
    /// Artist name, nationality and life dates as a single display string.
    #[serde(default)]
    pub artist_display: Option<String>,
    /// Inscriptions on the work.
    #[serde(default)]
    pub inscriptions: Option<String>,
    /// Earliest year associated with the work.
    #[serde(default)]
    pub date_start: Option<i32>,
    /// Latest year associated with the work.
    #[serde(default)]
    pub date_end: Option<i32>,
}

impl Identified for Artwork {
    fn id(&self) -> RecordId {
        self.id
    }
}

impl Artwork {
    /// Field list requested from the API, matching the struct's fields.
    pub const FIELDS: &'static str =
        "id,title,place_of_origin,artist_display,inscriptions,date_start,date_end";

    /// Column titles in the same order as [`Artwork::cells`].
    pub const COLUMN_TITLES: [&'static str; 6] = [
        "Title",
        "Place of Origin",
        "Artist Display",
        "Inscriptions",
        "Date Start",
        "Date End",
    ];

    /// Creates an artwork with only an id and a title.
    pub fn new(id: RecordId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: Some(title.into()),
            place_of_origin: None,
            artist_display: None,
            inscriptions: None,
            date_start: None,
            date_end: None,
        }
    }

    /// Deterministic placeholder artwork used by offline mode.
    pub fn sample(id: RecordId) -> Self {
        const PLACES: [&str; 5] = ["France", "Japan", "United States", "Italy", "Mexico"];
        let year = 1800 + (id % 200) as i32;
        Self {
            id,
            title: Some(format!("Untitled No. {}", id)),
            place_of_origin: Some(PLACES[(id % PLACES.len() as u64) as usize].to_string()),
            artist_display: Some(format!("Artist {}", id % 37)),
            inscriptions: if id % 3 == 0 {
                Some(format!("Signed lower right, {}", year))
            } else {
                None
            },
            date_start: Some(year),
            date_end: Some(year + (id % 4) as i32),
        }
    }

    /// Display cells in [`Artwork::COLUMN_TITLES`] order, with [`EMPTY_CELL`]
    /// standing in for missing values.
    pub fn cells(&self) -> Vec<String> {
        vec![
            display_or_empty(self.title.as_deref()),
            display_or_empty(self.place_of_origin.as_deref()),
            display_or_empty(self.artist_display.as_deref()),
            display_or_empty(self.inscriptions.as_deref()),
            self.date_start
                .map_or_else(|| EMPTY_CELL.to_string(), |y| y.to_string()),
            self.date_end
                .map_or_else(|| EMPTY_CELL.to_string(), |y| y.to_string()),
        ]
    }
}

fn display_or_empty(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => EMPTY_CELL.to_string(),
    }
}

/// Pagination block of an artworks listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Pagination {
    /// Total records in the collection.
    pub total: usize,
    /// Page size the server applied.
    #[serde(default)]
    pub limit: usize,
    /// Page the server returned.
    #[serde(default)]
    pub current_page: usize,
}

/// Body of `GET /api/v1/artworks`.
#[derive(Debug, Clone, Deserialize)]
pub struct ArtworksResponse {
    /// Pagination metadata.
    pub pagination: Pagination,
    /// Artworks on the requested page.
    pub data: Vec<Artwork>,
}

impl ArtworksResponse {
    /// Converts the response into a [`Page`] for the given request.
    pub fn into_page(self, number: usize, size: usize) -> Page<Artwork> {
        Page::new(number, size, self.data, self.pagination.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"{
        "pagination": {
            "total": 129884,
            "limit": 2,
            "offset": 0,
            "total_pages": 64942,
            "current_page": 1,
            "next_url": "https://api.artic.edu/api/v1/artworks?page=2&limit=2"
        },
        "data": [
            {
                "id": 27992,
                "title": "A Sunday on La Grande Jatte — 1884",
                "place_of_origin": "France",
                "artist_display": "Georges Seurat\nFrench, 1859-1891",
                "inscriptions": null,
                "date_start": 1884,
                "date_end": 1886
            },
            {
                "id": 16568,
                "title": "Water Lilies",
                "place_of_origin": "",
                "artist_display": "Claude Monet\nFrench, 1840-1926",
                "date_start": 1906,
                "date_end": null
            }
        ],
        "info": { "license_text": "CC0" },
        "config": { "iiif_url": "https://www.artic.edu/iiif/2" }
    }"#;

    #[test]
    fn test_decode_listing() {
        let response: ArtworksResponse = serde_json::from_str(LISTING).unwrap();
        assert_eq!(response.pagination.total, 129884);
        assert_eq!(response.pagination.current_page, 1);
        assert_eq!(response.data.len(), 2);
        assert_eq!(response.data[0].id, 27992);
        assert_eq!(response.data[1].inscriptions, None);
        assert_eq!(response.data[1].date_end, None);
    }

    #[test]
    fn test_into_page_keeps_request_shape() {
        let response: ArtworksResponse = serde_json::from_str(LISTING).unwrap();
        let page = response.into_page(1, 2);
        assert_eq!(page.number, 1);
        assert_eq!(page.size, 2);
        assert_eq!(page.total_count, 129884);
        assert_eq!(page.ids(), vec![27992, 16568]);
    }

    #[test]
    fn test_cells_fill_missing_values() {
        let response: ArtworksResponse = serde_json::from_str(LISTING).unwrap();
        let cells = response.data[1].cells();
        assert_eq!(cells.len(), Artwork::COLUMN_TITLES.len());
        assert_eq!(cells[0], "Water Lilies");
        // Blank strings count as missing
        assert_eq!(cells[1], EMPTY_CELL);
        assert_eq!(cells[3], EMPTY_CELL);
        assert_eq!(cells[4], "1906");
        assert_eq!(cells[5], EMPTY_CELL);
    }

    #[test]
    fn test_identified_through_references() {
        let artwork = Artwork::new(7, "Nighthawks");
        let by_ref: &Artwork = &artwork;
        assert_eq!(by_ref.id(), 7);
        assert_eq!((&by_ref).id(), 7);
    }

    #[test]
    fn test_sample_is_deterministic() {
        assert_eq!(Artwork::sample(9), Artwork::sample(9));
        assert_eq!(Artwork::sample(9).id, 9);
        assert!(Artwork::sample(9).inscriptions.is_some());
        assert!(Artwork::sample(10).inscriptions.is_none());
    }
}

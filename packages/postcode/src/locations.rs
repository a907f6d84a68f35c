//! Label lookup for the location picker.

use fuel_map_postcode_models::PostcodeRecord;

use crate::PostcodeError;
use crate::store::PostcodeStore;

/// Maximum number of matches returned by [`find_locations`].
pub const LOCATION_LIMIT: usize = 20;

/// Finds postcode areas whose label contains `fragment`, ignoring case.
///
/// Surrounding whitespace in `fragment` is ignored. Records without a
/// usable centroid are left out since they cannot anchor a search. At most
/// [`LOCATION_LIMIT`] records are returned, ordered by postcode.
///
/// # Errors
///
/// Returns [`PostcodeError::Storage`] if the store query fails.
pub async fn find_locations(
    store: &dyn PostcodeStore,
    fragment: &str,
) -> Result<Vec<PostcodeRecord>, PostcodeError> {
    let fragment = fragment.trim();
    let matches = store.find_by_label(fragment).await?;
    log::debug!("{} postcodes match {fragment:?}", matches.len());

    Ok(matches
        .into_iter()
        .filter(PostcodeRecord::has_centroid)
        .take(LOCATION_LIMIT)
        .collect())
}

#[cfg(test)]
mod tests {
    use fuel_map_geo_models::GeoPoint;

    use super::*;
    use crate::store::MemoryPostcodeStore;

    fn record(postcode: i32, label: &str) -> PostcodeRecord {
        PostcodeRecord {
            label: label.to_string(),
            postcode,
            population: 100,
            area_sq_km: 1.0,
            centroid: GeoPoint::new(53.5, 10.0),
        }
    }

    #[tokio::test]
    async fn trims_and_ignores_case() {
        let store = MemoryPostcodeStore::with_records([
            record(24103, "24103 Kiel"),
            record(24105, "24105 Kiel Düsternbrook"),
            record(20095, "20095 Hamburg"),
        ]);
        let found = find_locations(&store, "  KIEL ").await.unwrap();
        assert_eq!(
            found.iter().map(|r| r.postcode).collect::<Vec<_>>(),
            vec![24103, 24105]
        );
    }

    #[tokio::test]
    async fn caps_results() {
        let store = MemoryPostcodeStore::with_records(
            (0..30).map(|i| record(20_000 + i, &format!("{} Hamburg", 20_000 + i))),
        );
        let found = find_locations(&store, "hamburg").await.unwrap();
        assert_eq!(found.len(), LOCATION_LIMIT);
        assert_eq!(found[0].postcode, 20_000);
    }

    #[tokio::test]
    async fn skips_records_without_centroid() {
        let mut flat = record(99_999, "99999 Hamburg Hafen");
        flat.centroid = GeoPoint::new(f64::NAN, f64::NAN);
        let store = MemoryPostcodeStore::with_records([flat, record(20095, "20095 Hamburg")]);

        let found = find_locations(&store, "hamburg").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].postcode, 20095);
    }
}

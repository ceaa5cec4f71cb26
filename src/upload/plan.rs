//! Upload planning — the pure half of the pipeline.
//!
//! Three steps, in order: pick the best variant of each photo, assign a
//! collision-free file name per photo in metadata order, then sort by
//! pixel area and cut the plan down to the requested count. Nothing here
//! touches the network or the filesystem.

use std::collections::HashSet;

use chrono::NaiveDate;
use thiserror::Error;

use crate::vk::photo::{Photo, PhotoVariant, SizeTag, FALLBACK_PRIORITY};

#[derive(Debug, Error)]
pub enum SelectError {
    #[error("photo {photo_id}: no usable size variant")]
    NoVariantFound { photo_id: i64 },
}

/// A photo with its chosen variant and assigned destination file name.
#[derive(Debug, Clone)]
pub struct SelectedPhoto {
    pub id: i64,
    pub likes: u32,
    pub date: NaiveDate,
    pub chosen: PhotoVariant,
    /// Measured area of the chosen variant, or the tag's reference area
    /// when the selection fell back to the priority table. Drives the
    /// plan ordering either way.
    pub pixel_area: u64,
    pub file_name: String,
}

/// One unit of upload work: where to write on Disk, where the bytes come
/// from, and what the manifest should record afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPlanItem {
    pub remote_path: String,
    pub source_url: String,
    pub file_name: String,
    pub tag: SizeTag,
}

/// Pick the variant to upload for `photo`.
///
/// Primary rule: maximum declared `width * height`, first occurrence
/// winning ties; zero-area entries never win. When the first listed
/// variant reports a zero dimension the API omitted pixel sizes for this
/// photo, so the fixed tag-priority table decides instead, and the tag's
/// reference area stands in for the measured one.
pub fn select_best_variant(photo: &Photo) -> Result<(PhotoVariant, u64), SelectError> {
    let first = photo
        .variants
        .first()
        .ok_or(SelectError::NoVariantFound { photo_id: photo.id })?;

    if first.width == 0 || first.height == 0 {
        for tag in FALLBACK_PRIORITY {
            if let Some(variant) = photo.variants.iter().find(|v| v.tag == tag) {
                return Ok((variant.clone(), tag.reference_area()));
            }
        }
        return Err(SelectError::NoVariantFound { photo_id: photo.id });
    }

    let mut best = first;
    for variant in &photo.variants[1..] {
        if variant.pixel_area() > best.pixel_area() {
            best = variant;
        }
    }
    Ok((best.clone(), best.pixel_area()))
}

/// Extension of a variant URL: everything after the last dot, truncated
/// to 3 characters. `.jpeg` becomes `jpe`, and a trailing query string is
/// hidden by the truncation (`a.jpg?size=50` yields `jpg`).
pub fn extension_from_url(url: &str) -> &str {
    let after_dot = url.rsplit('.').next().unwrap_or(url);
    after_dot.get(..3).unwrap_or(after_dot)
}

/// Assign a destination file name for `photo`, registering it in `used`.
///
/// Base name is `<likes>.<ext>`; when that name is taken the upload date
/// disambiguates: `<likes>_<YYYY-MM-DD>.<ext>`. The dated fallback is not
/// re-checked, so a third photo with identical likes, extension and date
/// still collides (known limitation).
pub fn assign_file_name(
    photo: &Photo,
    chosen: &PhotoVariant,
    used: &mut HashSet<String>,
) -> String {
    let ext = extension_from_url(&chosen.url);
    let mut name = format!("{}.{}", photo.likes, ext);
    if used.contains(&name) {
        name = format!("{}_{}.{}", photo.likes, photo.date.format("%Y-%m-%d"), ext);
    }
    used.insert(name.clone());
    name
}

/// Result of running selection and naming over a photo batch.
#[derive(Debug, Default)]
pub struct SelectionOutcome {
    pub selected: Vec<SelectedPhoto>,
    /// Photos dropped with the reason, for the run report.
    pub skipped: Vec<(i64, String)>,
}

/// Select a variant and assign a file name for every photo, in metadata
/// order. Photos without a usable variant are skipped, not fatal.
pub fn select_photos(photos: &[Photo]) -> SelectionOutcome {
    let mut outcome = SelectionOutcome::default();
    let mut used = HashSet::new();

    for photo in photos {
        match select_best_variant(photo) {
            Ok((chosen, pixel_area)) => {
                let file_name = assign_file_name(photo, &chosen, &mut used);
                outcome.selected.push(SelectedPhoto {
                    id: photo.id,
                    likes: photo.likes,
                    date: photo.date,
                    chosen,
                    pixel_area,
                    file_name,
                });
            }
            Err(e) => outcome.skipped.push((photo.id, e.to_string())),
        }
    }
    outcome
}

/// Order the selected photos by pixel area (largest first, stable on
/// ties) and keep the top `requested`, producing the upload plan.
pub fn build_plan(
    selected: &[SelectedPhoto],
    requested: usize,
    folder: &str,
) -> Vec<UploadPlanItem> {
    let mut order: Vec<&SelectedPhoto> = selected.iter().collect();
    order.sort_by(|a, b| b.pixel_area.cmp(&a.pixel_area));
    order.truncate(requested.min(selected.len()));

    order
        .into_iter()
        .map(|photo| {
            let remote_path = if folder.is_empty() {
                photo.file_name.clone()
            } else {
                format!("{}/{}", folder, photo.file_name)
            };
            UploadPlanItem {
                remote_path,
                source_url: photo.chosen.url.clone(),
                file_name: photo.file_name.clone(),
                tag: photo.chosen.tag,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variant(tag: SizeTag, url: &str, width: u32, height: u32) -> PhotoVariant {
        PhotoVariant {
            tag,
            url: url.to_string(),
            width,
            height,
        }
    }

    fn photo(id: i64, likes: u32, date: (i32, u32, u32), variants: Vec<PhotoVariant>) -> Photo {
        Photo {
            id,
            likes,
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            variants,
        }
    }

    #[test]
    fn test_select_max_area() {
        let p = photo(
            1,
            0,
            (2023, 1, 1),
            vec![
                variant(SizeTag::S, "https://cdn/s.jpg", 75, 50),
                variant(SizeTag::Z, "https://cdn/z.jpg", 1080, 720),
                variant(SizeTag::X, "https://cdn/x.jpg", 604, 403),
            ],
        );
        let (chosen, area) = select_best_variant(&p).unwrap();
        assert_eq!(chosen.tag, SizeTag::Z);
        assert_eq!(area, 1080 * 720);
    }

    #[test]
    fn test_select_tie_keeps_first_occurrence() {
        let p = photo(
            1,
            0,
            (2023, 1, 1),
            vec![
                variant(SizeTag::X, "https://cdn/x.jpg", 600, 400),
                variant(SizeTag::Y, "https://cdn/y.jpg", 400, 600),
            ],
        );
        let (chosen, _) = select_best_variant(&p).unwrap();
        assert_eq!(chosen.tag, SizeTag::X);
    }

    #[test]
    fn test_select_zero_area_entries_never_win() {
        let p = photo(
            1,
            0,
            (2023, 1, 1),
            vec![
                variant(SizeTag::S, "https://cdn/s.jpg", 75, 50),
                variant(SizeTag::W, "https://cdn/w.jpg", 2560, 0),
            ],
        );
        let (chosen, _) = select_best_variant(&p).unwrap();
        assert_eq!(chosen.tag, SizeTag::S);
    }

    #[test]
    fn test_select_fallback_when_first_variant_has_zero_dimension() {
        // Other variants declare huge dimensions, but the zero on the
        // first entry routes selection through the priority table.
        let p = photo(
            1,
            0,
            (2023, 1, 1),
            vec![
                variant(SizeTag::S, "https://cdn/s.jpg", 0, 0),
                variant(SizeTag::X, "https://cdn/x.jpg", 9000, 9000),
                variant(SizeTag::Z, "https://cdn/z.jpg", 1, 1),
            ],
        );
        let (chosen, area) = select_best_variant(&p).unwrap();
        assert_eq!(chosen.tag, SizeTag::Z);
        assert_eq!(area, SizeTag::Z.reference_area());
    }

    #[test]
    fn test_select_fallback_priority_order() {
        let p = photo(
            1,
            0,
            (2023, 1, 1),
            vec![
                variant(SizeTag::S, "https://cdn/s.jpg", 0, 75),
                variant(SizeTag::M, "https://cdn/m.jpg", 0, 0),
                variant(SizeTag::P, "https://cdn/p.jpg", 0, 0),
            ],
        );
        // No w/z/y/x/r/q/o present; m outranks p in the fixed order.
        let (chosen, _) = select_best_variant(&p).unwrap();
        assert_eq!(chosen.tag, SizeTag::M);
    }

    #[test]
    fn test_select_no_variants_is_an_error() {
        let p = photo(7, 0, (2023, 1, 1), vec![]);
        let err = select_best_variant(&p).unwrap_err();
        assert!(matches!(err, SelectError::NoVariantFound { photo_id: 7 }));
    }

    #[test]
    fn test_extension_from_url() {
        assert_eq!(extension_from_url("https://cdn/photo.jpg"), "jpg");
        assert_eq!(extension_from_url("https://cdn/photo.jpeg"), "jpe");
        assert_eq!(extension_from_url("https://cdn/photo.png"), "png");
        // Query strings survive the rule because the truncation hides them.
        assert_eq!(extension_from_url("https://cdn/a.jpg?size=50x50"), "jpg");
        assert_eq!(extension_from_url("no-dot-at-all"), "no-");
        assert_eq!(extension_from_url("short.io"), "io");
    }

    #[test]
    fn test_assign_file_name_unique() {
        let mut used = HashSet::new();
        let p = photo(
            1,
            10,
            (2023, 1, 1),
            vec![variant(SizeTag::X, "https://cdn/a.jpg", 604, 403)],
        );
        let name = assign_file_name(&p, &p.variants[0], &mut used);
        assert_eq!(name, "10.jpg");
        assert!(used.contains("10.jpg"));
    }

    #[test]
    fn test_assign_file_name_collision_appends_date() {
        let mut used = HashSet::new();
        let a = photo(
            1,
            10,
            (2023, 1, 1),
            vec![variant(SizeTag::X, "https://cdn/a.jpg", 604, 403)],
        );
        let b = photo(
            2,
            10,
            (2023, 1, 2),
            vec![variant(SizeTag::X, "https://cdn/b.jpg", 604, 403)],
        );
        assert_eq!(assign_file_name(&a, &a.variants[0], &mut used), "10.jpg");
        assert_eq!(
            assign_file_name(&b, &b.variants[0], &mut used),
            "10_2023-01-02.jpg"
        );
    }

    #[test]
    fn test_assign_file_name_third_collision_still_collides() {
        // Known limitation: the dated fallback is not re-checked.
        let mut used = HashSet::new();
        let make = |id| {
            photo(
                id,
                10,
                (2023, 1, 2),
                vec![variant(SizeTag::X, "https://cdn/a.jpg", 604, 403)],
            )
        };
        let (a, b, c) = (make(1), make(2), make(3));
        assign_file_name(&a, &a.variants[0], &mut used);
        let second = assign_file_name(&b, &b.variants[0], &mut used);
        let third = assign_file_name(&c, &c.variants[0], &mut used);
        assert_eq!(second, "10_2023-01-02.jpg");
        assert_eq!(third, second);
    }

    #[test]
    fn test_select_photos_names_in_metadata_order() {
        let photos = vec![
            photo(
                1,
                10,
                (2023, 1, 1),
                vec![variant(SizeTag::X, "https://cdn/a.jpg", 604, 403)],
            ),
            photo(
                2,
                10,
                (2023, 1, 2),
                vec![variant(SizeTag::X, "https://cdn/b.jpg", 604, 403)],
            ),
        ];
        let outcome = select_photos(&photos);
        assert_eq!(outcome.selected[0].file_name, "10.jpg");
        assert_eq!(outcome.selected[1].file_name, "10_2023-01-02.jpg");
        assert!(outcome.skipped.is_empty());
    }

    #[test]
    fn test_select_photos_reports_skipped() {
        let photos = vec![
            photo(1, 0, (2023, 1, 1), vec![]),
            photo(
                2,
                3,
                (2023, 1, 1),
                vec![variant(SizeTag::M, "https://cdn/m.jpg", 130, 87)],
            ),
        ];
        let outcome = select_photos(&photos);
        assert_eq!(outcome.selected.len(), 1);
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].0, 1);
    }

    fn selected(id: i64, area: u64, name: &str, url: &str) -> SelectedPhoto {
        SelectedPhoto {
            id,
            likes: 0,
            date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            chosen: variant(SizeTag::X, url, 0, 0),
            pixel_area: area,
            file_name: name.to_string(),
        }
    }

    #[test]
    fn test_build_plan_sorts_and_truncates() {
        let photos = vec![
            selected(1, 500, "a.jpg", "https://cdn/a.jpg"),
            selected(2, 9000, "b.jpg", "https://cdn/b.jpg"),
            selected(3, 100, "c.jpg", "https://cdn/c.jpg"),
        ];
        let plan = build_plan(&photos, 2, "backup");
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].remote_path, "backup/b.jpg");
        assert_eq!(plan[1].remote_path, "backup/a.jpg");
    }

    #[test]
    fn test_build_plan_stable_on_equal_areas() {
        let photos = vec![
            selected(1, 100, "first.jpg", "https://cdn/1.jpg"),
            selected(2, 100, "second.jpg", "https://cdn/2.jpg"),
        ];
        let plan = build_plan(&photos, 10, "");
        assert_eq!(plan[0].file_name, "first.jpg");
        assert_eq!(plan[1].file_name, "second.jpg");
    }

    #[test]
    fn test_build_plan_requested_beyond_available() {
        let photos = vec![selected(1, 1, "a.jpg", "https://cdn/a.jpg")];
        assert_eq!(build_plan(&photos, 5, "backup").len(), 1);
        assert_eq!(build_plan(&photos, 0, "backup").len(), 0);
    }

    #[test]
    fn test_build_plan_empty_folder_uses_bare_names() {
        let photos = vec![selected(1, 1, "a.jpg", "https://cdn/a.jpg")];
        let plan = build_plan(&photos, 1, "");
        assert_eq!(plan[0].remote_path, "a.jpg");
        assert_eq!(plan[0].source_url, "https://cdn/a.jpg");
    }
}

use crate::annotations::bounding_box::BoundingBoxGeometry;

/// Fraction of `equipment_box` that lies inside `person_box`, in `[0.0, 1.0]`.
///
/// The measure is asymmetric: the denominator is the equipment box's own area, so an
/// oversized equipment box that swallows the whole person still scores low. This is not IoU.
///
/// A zero-area equipment box always scores `0.0`; a degenerate box can never be contained.
pub fn containment_ratio(
    person_box: &impl BoundingBoxGeometry,
    equipment_box: &impl BoundingBoxGeometry,
) -> f32 {
    let equipment_area = equipment_box.width() * equipment_box.height();
    if equipment_area == 0.0 {
        return 0.0;
    }
    let intersection_area = person_box.intersection_area(equipment_box);
    (intersection_area / equipment_area).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::bounding_box::BoundingBox;

    fn bbox(left: f32, top: f32, right: f32, bottom: f32) -> BoundingBox {
        BoundingBox::new(left, top, right, bottom).unwrap()
    }

    #[test]
    fn equipment_fully_inside_person_is_one() {
        let person = bbox(0.0, 0.0, 100.0, 200.0);
        assert_eq!(containment_ratio(&person, &bbox(10.0, 10.0, 90.0, 100.0)), 1.0);
        assert_eq!(containment_ratio(&person, &person), 1.0);
        assert_eq!(containment_ratio(&person, &bbox(0.0, 150.0, 100.0, 200.0)), 1.0);
    }

    #[test]
    fn disjoint_boxes_are_zero() {
        let person = bbox(0.0, 0.0, 100.0, 200.0);
        assert_eq!(containment_ratio(&person, &bbox(150.0, 0.0, 200.0, 50.0)), 0.0);
        assert_eq!(containment_ratio(&person, &bbox(0.0, 300.0, 50.0, 350.0)), 0.0);
        // Touching edges share no area.
        assert_eq!(containment_ratio(&person, &bbox(100.0, 0.0, 150.0, 50.0)), 0.0);
    }

    #[test]
    fn zero_area_equipment_is_zero() {
        let person = bbox(0.0, 0.0, 100.0, 200.0);
        assert_eq!(containment_ratio(&person, &bbox(5.0, 5.0, 5.0, 50.0)), 0.0);
        assert_eq!(containment_ratio(&person, &bbox(5.0, 5.0, 50.0, 5.0)), 0.0);
        assert_eq!(containment_ratio(&person, &bbox(500.0, 500.0, 500.0, 500.0)), 0.0);
    }

    #[test]
    fn barely_overlapping_equipment_scores_low() {
        let person = bbox(0.0, 0.0, 100.0, 200.0);
        let ratio = containment_ratio(&person, &bbox(95.0, 195.0, 150.0, 250.0));
        assert!((ratio - 25.0 / 3025.0).abs() < 1e-6);
        assert!(ratio < 0.5);
    }

    #[test]
    fn oversized_equipment_scores_low_even_when_covering_person() {
        let person = bbox(100.0, 100.0, 200.0, 300.0);
        let whole_image = bbox(0.0, 0.0, 1000.0, 1000.0);
        let ratio = containment_ratio(&person, &whole_image);
        assert!((ratio - 0.02).abs() < 1e-6);
    }

    #[test]
    fn ratio_is_asymmetric() {
        let small = bbox(0.0, 0.0, 10.0, 10.0);
        let large = bbox(0.0, 0.0, 20.0, 20.0);
        assert_eq!(containment_ratio(&large, &small), 1.0);
        assert_eq!(containment_ratio(&small, &large), 0.25);
    }

    #[test]
    fn partial_overlap() {
        let person = bbox(0.0, 0.0, 100.0, 100.0);
        assert!((containment_ratio(&person, &bbox(70.0, 0.0, 170.0, 10.0)) - 0.3).abs() < 1e-6);
        assert!((containment_ratio(&person, &bbox(20.0, 0.0, 120.0, 10.0)) - 0.8).abs() < 1e-6);
    }
}

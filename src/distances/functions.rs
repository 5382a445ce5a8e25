//! Built-in box distance functions.

use crate::annotation::BoxAnnotation;

/// IoU (Intersection over Union) distance between two boxes.
///
/// Returns 1 - IoU, so lower is better (identical boxes = 0, disjoint = 1).
/// Degenerate boxes (no positive area) are at the maximal distance 1.
pub fn iou_distance(a: &BoxAnnotation, b: &BoxAnnotation) -> f64 {
    if a.is_degenerate() || b.is_degenerate() {
        return 1.0;
    }

    let [a_x1, a_y1, a_x2, a_y2] = a.corners();
    let [b_x1, b_y1, b_x2, b_y2] = b.corners();

    // Intersection
    let inter_w = (a_x2.min(b_x2) - a_x1.max(b_x1)).max(0.0);
    let inter_h = (a_y2.min(b_y2) - a_y1.max(b_y1)).max(0.0);
    let inter_area = inter_w * inter_h;

    // Union
    let union_area = a.area() + b.area() - inter_area;

    if union_area > 0.0 {
        (1.0 - inter_area / union_area).clamp(0.0, 1.0)
    } else {
        1.0
    }
}

/// Euclidean distance between box centres, normalised by the ground-truth diagonal.
///
/// A hypothesis whose centre lies half a diagonal away is at distance 0.5.
/// The distance is unbounded, so degenerate boxes are infinitely far and never
/// match, whatever the threshold.
pub fn center_distance(ground_truth: &BoxAnnotation, hypothesis: &BoxAnnotation) -> f64 {
    if ground_truth.is_degenerate() || hypothesis.is_degenerate() {
        return f64::INFINITY;
    }

    let (gx, gy) = ground_truth.center();
    let (hx, hy) = hypothesis.center();
    let diagonal = ground_truth.width.hypot(ground_truth.height);

    (gx - hx).hypot(gy - hy) / diagonal
}

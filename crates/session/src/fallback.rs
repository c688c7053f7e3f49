//! What gets shown instead of the accelerated view: a static map with positioned markers
//! when no context exists, or an error notice when creating one failed.

use foundation::color::Rgb;
use foundation::math::project_equirectangular;
use gpu::{Capability, CapabilityDetector, ContextCheck, PhysicalSize, RenderBackend, RenderError};
use runtime::TickSource;
use scene::data::DonationPoint;
use scene::palette::category_color;
use serde::Serialize;
use tracing::error;

use crate::resize::ContainerSize;
use crate::session::AnimationSession;
use crate::views::SceneView;

/// Marker placed with CSS percentages over the map image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FallbackMarker {
    pub left_percent: f64,
    pub top_percent: f64,
    pub color: Rgb,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fallback2D {
    pub image_url: String,
    pub markers: Vec<FallbackMarker>,
}

pub fn fallback_markers(donations: &[DonationPoint]) -> Vec<FallbackMarker> {
    donations
        .iter()
        .map(|d| {
            let geo = d.geo();
            let uv = project_equirectangular(geo.lat_deg, geo.lng_deg);
            FallbackMarker {
                left_percent: uv.x * 100.0,
                top_percent: uv.y * 100.0,
                color: category_color(&d.category),
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorFallback {
    pub title: String,
    pub message: String,
    pub suggestions: Vec<String>,
}

impl ErrorFallback {
    pub fn unsupported() -> Self {
        Self {
            title: "WebGL not supported".to_string(),
            message: "Your browser could not create a WebGL context, which this view needs."
                .to_string(),
            suggestions: vec![
                "Google Chrome (latest version)".to_string(),
                "Mozilla Firefox (latest version)".to_string(),
                "Microsoft Edge (latest version)".to_string(),
            ],
        }
    }
}

/// The surface a mount ended up with.
pub enum Presentation<V: SceneView, B: RenderBackend, S: TickSource> {
    Accelerated(AnimationSession<V, B, S>),
    Static(Fallback2D),
    Error(ErrorFallback),
}

impl<V: SceneView, B: RenderBackend, S: TickSource> Presentation<V, B, S> {
    pub fn kind(&self) -> &'static str {
        match self {
            Presentation::Accelerated(_) => "accelerated",
            Presentation::Static(_) => "static",
            Presentation::Error(_) => "error",
        }
    }

    pub fn session(&mut self) -> Option<&mut AnimationSession<V, B, S>> {
        match self {
            Presentation::Accelerated(s) => Some(s),
            _ => None,
        }
    }
}

/// Detects capability, then mounts the view or degrades to a fallback. Never fails.
pub fn present<V, B, S, P>(
    detector: &mut CapabilityDetector<P>,
    view: V,
    ticks: S,
    size: ContainerSize,
    acquire: impl FnOnce(PhysicalSize) -> Result<B, RenderError>,
) -> Presentation<V, B, S>
where
    V: SceneView,
    B: RenderBackend,
    S: TickSource,
    P: ContextCheck,
{
    if detector.detect() == Capability::NotCapable {
        return match view.fallback() {
            Some(fallback) => Presentation::Static(fallback),
            None => Presentation::Error(ErrorFallback::unsupported()),
        };
    }
    match AnimationSession::mount(view, ticks, size, acquire) {
        Ok(session) => Presentation::Accelerated(session),
        Err(err) => {
            error!(error = %err, "falling back to error notice");
            Presentation::Error(ErrorFallback::unsupported())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Presentation, fallback_markers, present};
    use crate::resize::ContainerSize;
    use crate::views::{FundsMapConfig, FundsMapView, GlobeConfig, GlobeView};
    use foundation::color::Rgb;
    use gpu::CapabilityDetector;
    use gpu::headless::{HeadlessBackend, HeadlessOptions};
    use runtime::ManualTickSource;
    use scene::data::DonationPoint;
    use std::cell::Cell;

    fn size() -> ContainerSize {
        ContainerSize::new(800.0, 600.0, 1.0)
    }

    #[test]
    fn markers_use_equirectangular_percentages() {
        let m = fallback_markers(&[
            DonationPoint::new(0.0, 0.0, 1.0, "education"),
            DonationPoint::new(90.0, -180.0, 1.0, "??"),
        ]);
        assert_eq!((m[0].left_percent, m[0].top_percent), (50.0, 50.0));
        assert_eq!((m[1].left_percent, m[1].top_percent), (0.0, 0.0));
        assert_eq!(m[0].color, Rgb::from_hex(0x4285f4));
        assert_eq!(m[1].color, Rgb::from_hex(0xfbbc05));
    }

    #[test]
    fn not_capable_never_builds_the_scene() {
        let acquired = Cell::new(false);
        let mut detector = CapabilityDetector::new(|| Err("no webgl".to_string()));
        let view = GlobeView::new(
            GlobeConfig::default(),
            vec![DonationPoint::new(1.0, 2.0, 3.0, "water")],
        );
        let ticks = ManualTickSource::new();
        let p = present(&mut detector, view, ticks.clone(), size(), |px| {
            acquired.set(true);
            HeadlessBackend::acquire(px, HeadlessOptions::default())
        });
        assert!(matches!(&p, Presentation::Static(f) if f.markers.len() == 1));
        assert!(!acquired.get());
        assert_eq!(ticks.requested(), 0);
    }

    #[test]
    fn views_without_static_fallback_show_error_notice() {
        let mut detector = CapabilityDetector::new(|| Ok(false));
        let view = FundsMapView::new(FundsMapConfig::default(), Vec::new());
        let p = present(&mut detector, view, ManualTickSource::new(), size(), |px| {
            HeadlessBackend::acquire(px, HeadlessOptions::default())
        });
        assert_eq!(p.kind(), "error");
    }

    #[test]
    fn context_failure_shows_error_notice() {
        let mut detector = CapabilityDetector::new(|| Ok(true));
        let view = GlobeView::new(GlobeConfig::default(), Vec::new());
        let p = present(&mut detector, view, ManualTickSource::new(), size(), |px| {
            HeadlessBackend::acquire(
                px,
                HeadlessOptions {
                    context_failure: Some("context lost".into()),
                    ..Default::default()
                },
            )
        });
        assert_eq!(p.kind(), "error");
    }

    #[test]
    fn capable_mounts_a_running_session() {
        let mut detector = CapabilityDetector::new(|| Ok(true));
        let view = GlobeView::new(GlobeConfig::default(), Vec::new());
        let mut p = present(&mut detector, view, ManualTickSource::new(), size(), |px| {
            HeadlessBackend::acquire(px, HeadlessOptions::default())
        });
        let session = p.session().expect("session");
        assert!(session.is_running());
    }
}

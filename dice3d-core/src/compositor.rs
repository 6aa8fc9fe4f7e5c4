/// Combines nested cube layers into one depth-sorted draw list (painter's algorithm)
use crate::geometry::{Color, CubeGeometry, Face};
use crate::layer::{DiceLayer, LayerLock};
use crate::math::{average_z, ScreenPoint, Vec2, Vec3};
use crate::projection::{pip_outline, PipStyle, Projector};
use crate::shading::{shade, Lighting};
use crate::transform::RotationState;

/// Transient scale applied to a single layer (press shrink or reveal bounce)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pulse {
    pub layer: usize,
    pub scale: f32,
}

/// Everything needed to place every layer for one frame
#[derive(Debug, Clone, Copy)]
pub struct ComposeInput<'a> {
    pub layers: &'a [DiceLayer],
    pub locks: &'a [LayerLock],
    /// Smoothed per-layer rotation, indexed like `layers`
    pub states: &'a [RotationState],
    /// Global target rotation
    pub target: RotationState,
    /// Snapshot held by the outermost layer while the parent is not interactive
    pub frozen_parent: Option<RotationState>,
    pub pulse: Option<Pulse>,
}

/// A transformed face waiting to be drawn
#[derive(Debug, Clone, Copy)]
pub struct DrawFace<'a> {
    pub layer_index: usize,
    pub layer: &'a DiceLayer,
    pub face: &'a Face,
    pub corners: [Vec3; 4],
    /// Average z of the corners; larger is farther from the camera
    pub depth: f32,
}

#[derive(Debug, Clone, Default)]
pub struct DrawList<'a> {
    pub faces: Vec<DrawFace<'a>>,
}

impl<'a> DrawList<'a> {
    /// Stable sort: backdrop layers first, then farthest first. Faces at
    /// equal depth keep insertion order.
    pub fn sort_back_to_front(&mut self) {
        self.faces.sort_by(|a, b| {
            b.layer
                .backdrop
                .cmp(&a.layer.backdrop)
                .then(b.depth.total_cmp(&a.depth))
        });
    }

    pub fn len(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }
}

/// Effective rotation of layer `index`: lock, then pinned layer, then frozen
/// parent, then live state
pub fn resolve_rotation(index: usize, input: &ComposeInput<'_>) -> RotationState {
    let pinned = input.layers.get(index).and_then(|layer| layer.pinned);
    match (input.locks.get(index), pinned) {
        (Some(lock), _) if lock.locked => RotationState::new(lock.rot_x, lock.rot_y),
        (_, Some(rotation)) => rotation,
        _ if index == 0 => input.frozen_parent.unwrap_or(input.target),
        _ => input.states.get(index).copied().unwrap_or(input.target),
    }
}

/// Transform every enabled layer and return its faces sorted back to front
pub fn compose<'a>(input: &ComposeInput<'a>) -> DrawList<'a> {
    let mut list = DrawList {
        faces: Vec::with_capacity(input.layers.len() * 6),
    };

    for (index, layer) in input.layers.iter().enumerate() {
        if !layer.enabled {
            continue;
        }
        let rotation = resolve_rotation(index, input).inverted(layer.invert_x, layer.invert_y);
        let ratio = match input.pulse {
            Some(pulse) if pulse.layer == index => layer.ratio * pulse.scale,
            _ => layer.ratio,
        };
        let transformed = layer.geometry.vertices.map(|v| rotation.apply(&(v * ratio)));

        for face in &layer.geometry.faces {
            let corners = CubeGeometry::face_corners(face, &transformed);
            list.faces.push(DrawFace {
                layer_index: index,
                layer,
                face,
                corners,
                depth: average_z(&corners),
            });
        }
    }

    list.sort_back_to_front();
    list
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderOptions {
    pub pip_style: PipStyle,
    pub pip_color: Color,
    pub edge_color: Color,
    /// Normalized offset of the last touch from the surface center
    pub pointer_dir: Option<Vec2>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            pip_style: PipStyle::default(),
            pip_color: Color::WHITE,
            edge_color: Color::BLACK.with_alpha(0.25),
            pointer_dir: None,
        }
    }
}

/// A face ready for a 2D surface, in drawing order
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedFace {
    pub layer_index: usize,
    pub polygon: [ScreenPoint; 4],
    pub fill: Color,
    pub brightness: f32,
    pub edge: Option<Color>,
    pub pip_color: Color,
    pub pips: Vec<Vec<ScreenPoint>>,
    pub depth: f32,
}

/// Project and shade a sorted draw list. Layers may override the shading
/// model and focal length.
pub fn render(
    list: &DrawList<'_>,
    projector: &Projector,
    lighting: &Lighting,
    options: &RenderOptions,
) -> Vec<RenderedFace> {
    list.faces
        .iter()
        .map(|draw| {
            let projector = match draw.layer.focal_length {
                Some(focal_length) => projector.with_focal_length(focal_length),
                None => *projector,
            };
            let lighting = match draw.layer.shading {
                Some(model) => lighting.with_model(model),
                None => *lighting,
            };
            let normal = Face::normal(&draw.corners);
            let brightness = lighting.brightness(&normal, options.pointer_dir);
            let pips = if draw.layer.show_pips {
                draw.face
                    .pips
                    .iter()
                    .map(|pip| {
                        pip_outline(&draw.corners, pip, &options.pip_style)
                            .iter()
                            .map(|p| projector.project(p))
                            .collect()
                    })
                    .collect()
            } else {
                Vec::new()
            };

            RenderedFace {
                layer_index: draw.layer_index,
                polygon: projector.project_all(&draw.corners),
                fill: shade(draw.face.color, brightness, draw.layer.alpha),
                brightness,
                edge: draw.layer.show_edges.then_some(options.edge_color),
                pip_color: options.pip_color,
                pips,
                depth: draw.depth,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::presets;
    use crate::projection::{ProjectionMode, Viewport};
    use crate::shading::ShadingModel;

    fn input<'a>(
        layers: &'a [DiceLayer],
        locks: &'a [LayerLock],
        states: &'a [RotationState],
    ) -> ComposeInput<'a> {
        ComposeInput {
            layers,
            locks,
            states,
            target: RotationState::new(0.4, 0.9),
            frozen_parent: None,
            pulse: None,
        }
    }

    #[test]
    fn test_sorted_far_to_near() {
        let layers = presets::nested().unwrap();
        let states = vec![RotationState::new(0.1, 0.2); layers.len()];
        let list = compose(&input(&layers, &[], &states));
        assert_eq!(list.len(), 18);
        for pair in list.faces.windows(2) {
            assert!(pair[0].depth >= pair[1].depth);
        }
    }

    #[test]
    fn test_sort_is_stable_for_equal_depth() {
        let layers = presets::classic();
        let mut list = compose(&input(&layers, &[], &[]));
        for (i, face) in list.faces.iter_mut().enumerate() {
            face.depth = if i % 2 == 0 { 1.0 } else { 0.0 };
            face.layer_index = i;
        }
        list.sort_back_to_front();
        let order: Vec<usize> = list.faces.iter().map(|f| f.layer_index).collect();
        assert_eq!(order, vec![0, 2, 4, 1, 3, 5]);
    }

    #[test]
    fn test_rotation_precedence() {
        let layers = presets::nested().unwrap();
        let states = vec![RotationState::new(0.1, 0.1); 3];
        let locks = [LayerLock::unlocked(), LayerLock::locked(2.0, 3.0)];
        let mut inp = input(&layers, &locks, &states);

        assert_eq!(resolve_rotation(0, &inp), inp.target);
        assert_eq!(resolve_rotation(1, &inp), RotationState::new(2.0, 3.0));
        assert_eq!(resolve_rotation(2, &inp), RotationState::new(0.1, 0.1));

        inp.frozen_parent = Some(RotationState::new(-1.0, -1.0));
        assert_eq!(resolve_rotation(0, &inp), RotationState::new(-1.0, -1.0));

        let locks = [LayerLock::locked(0.5, 0.5)];
        inp.locks = &locks;
        assert_eq!(resolve_rotation(0, &inp), RotationState::new(0.5, 0.5));
    }

    #[test]
    fn test_disabled_layers_skipped() {
        let mut layers = presets::nested().unwrap();
        layers[1].enabled = false;
        let list = compose(&input(&layers, &[], &[]));
        assert_eq!(list.len(), 12);
        assert!(list.faces.iter().all(|f| f.layer_index != 1));
    }

    #[test]
    fn test_pulse_scales_only_its_layer() {
        let layers = vec![DiceLayer::standard(), DiceLayer::standard()];
        let mut inp = input(&layers, &[], &[]);
        inp.target = RotationState::zero();
        inp.pulse = Some(Pulse {
            layer: 1,
            scale: 0.5,
        });
        let list = compose(&inp);
        let extent = |layer: usize| {
            list.faces
                .iter()
                .filter(|f| f.layer_index == layer)
                .flat_map(|f| f.corners.iter())
                .map(|c| c.x.abs())
                .fold(0.0f32, f32::max)
        };
        assert!((extent(0) - 1.0).abs() < 1e-6);
        assert!((extent(1) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_render_outputs() {
        let layers = presets::classic();
        let list = compose(&input(&layers, &[], &[]));
        let projector = Projector::new(
            &Viewport::new(300.0, 300.0, 0.25),
            ProjectionMode::default(),
        );
        let faces = render(&list, &projector, &Lighting::default(), &RenderOptions::default());
        assert_eq!(faces.len(), 6);
        let pip_count: usize = faces.iter().map(|f| f.pips.len()).sum();
        assert_eq!(pip_count, 21);
        for face in &faces {
            assert!(face.brightness >= 0.3 - 1e-6);
            assert!((face.fill.a - 0.95).abs() < 1e-6);
            assert!(face.edge.is_none());
        }
    }

    #[test]
    fn test_backdrop_draws_first() {
        let layers = presets::with_cavity(presets::classic()).unwrap();
        let list = compose(&input(&layers, &[], &[]));
        assert_eq!(list.len(), 12);

        // The cavity is larger, so its front faces are nearer than the die's
        let nearest_cavity = list.faces[..6]
            .iter()
            .map(|f| f.depth)
            .fold(f32::INFINITY, f32::min);
        let nearest_die = list.faces[6..]
            .iter()
            .map(|f| f.depth)
            .fold(f32::INFINITY, f32::min);
        assert!(nearest_cavity < nearest_die);

        assert!(list.faces[..6].iter().all(|f| f.layer_index == 1));
        assert!(list.faces[6..].iter().all(|f| f.layer_index == 0));
        for pair in list.faces[6..].windows(2) {
            assert!(pair[0].depth >= pair[1].depth);
        }
    }

    #[test]
    fn test_pinned_layer_ignores_target() {
        let layers = presets::with_cavity(presets::nested().unwrap()).unwrap();
        let states = vec![RotationState::new(0.1, 0.1); layers.len()];
        let mut inp = input(&layers, &[], &states);
        assert_eq!(resolve_rotation(3, &inp), RotationState::new(-0.01, -0.032));

        inp.target = RotationState::new(2.0, -2.0);
        inp.frozen_parent = Some(RotationState::new(1.0, 1.0));
        assert_eq!(resolve_rotation(3, &inp), RotationState::new(-0.01, -0.032));

        let locks = [LayerLock::unlocked(); 3]
            .into_iter()
            .chain([LayerLock::locked(0.5, 0.5)])
            .collect::<Vec<_>>();
        inp.locks = &locks;
        assert_eq!(resolve_rotation(3, &inp), RotationState::new(0.5, 0.5));
    }

    #[test]
    fn test_layer_overrides_shading_and_focal_length() {
        let layers = presets::with_cavity(presets::classic()).unwrap();
        let list = compose(&input(&layers, &[], &[]));
        let projector = Projector::new(
            &Viewport::new(300.0, 300.0, 0.25),
            ProjectionMode::default(),
        );
        let lighting = Lighting::default();
        let half_lambert = ShadingModel::HalfLambert {
            shadow_intensity: 0.25,
        };
        let faces = render(&list, &projector, &lighting, &RenderOptions::default());

        for (draw, face) in list.faces.iter().zip(&faces) {
            let n_dot_l = Face::normal(&draw.corners).dot(&lighting.light_dir());
            if draw.layer.backdrop {
                assert!((face.brightness - half_lambert.apply(n_dot_l)).abs() < 1e-6);
                assert!(face.brightness >= 0.75 - 1e-6);
                assert_eq!(
                    face.polygon,
                    projector.with_focal_length(9.55).project_all(&draw.corners)
                );
                assert!(face.pips.is_empty());
            } else {
                assert!((face.brightness - lighting.model.apply(n_dot_l)).abs() < 1e-6);
                assert_eq!(face.polygon, projector.project_all(&draw.corners));
            }
        }
    }
}

use glam::{Vec3, Vec4};
use sceneview_object::Value;
use sceneview_render::RenderView;
use sceneview_scene::{Renderable, RenderableKind, props};

use crate::config::SceneConfig;

/// Many renderers sharing one window, each showing a background volume
/// plus labelmap volumes.
pub struct DemoScene {
    pub window: Renderable,
    pub renderers: Vec<Renderable>,
    pub volumes: Vec<Renderable>,
}

/// Viewport of cell `index` in a near-square grid of `count` cells,
/// as `(xmin, ymin, xmax, ymax)` in normalized window coordinates.
pub fn grid_viewport(index: usize, count: usize) -> Vec4 {
    let columns = (count as f32).sqrt().ceil().max(1.0) as usize;
    let rows = count.div_ceil(columns).max(1);
    let (col, row) = (index % columns, index / columns);
    let w = 1.0 / columns as f32;
    let h = 1.0 / rows as f32;
    // Row 0 is at the top.
    let ymax = 1.0 - row as f32 * h;
    Vec4::new(col as f32 * w, ymax - h, (col + 1) as f32 * w, ymax)
}

fn background(index: usize) -> Vec3 {
    let t = index as f32 * 0.37;
    Vec3::new(0.1 + 0.1 * t.sin().abs(), 0.1, 0.15 + 0.1 * t.cos().abs())
}

impl DemoScene {
    pub fn build(config: &SceneConfig) -> anyhow::Result<Self> {
        let window = Renderable::with_values(
            RenderableKind::RenderWindow,
            [
                (props::NAME, Value::from("demo")),
                (props::WIDTH, Value::from(i64::from(config.render.width))),
                (props::HEIGHT, Value::from(i64::from(config.render.height))),
            ],
        )?;

        let mut renderers = Vec::with_capacity(config.renderers);
        let mut volumes = Vec::new();
        for i in 0..config.renderers {
            let renderer = Renderable::with_values(
                RenderableKind::Renderer,
                [
                    (props::NAME, Value::from(format!("renderer-{i}"))),
                    (props::BACKGROUND, Value::from(background(i))),
                    (props::VIEWPORT, Value::from(grid_viewport(i, config.renderers))),
                ],
            )?;
            renderer.add_child(&Renderable::new(RenderableKind::Camera))?;

            for v in 0..config.volumes_per_renderer {
                // First volume is the background image, the rest are labelmaps.
                let blend = if v == 0 { "composite" } else { "label" };
                let volume = Renderable::with_values(
                    RenderableKind::Volume,
                    [
                        (props::NAME, Value::from(format!("volume-{i}-{v}"))),
                        (props::BLEND_MODE, Value::from(blend)),
                    ],
                )?;
                volume.add_child(&Renderable::new(RenderableKind::VolumeMapper))?;
                renderer.add_child(&volume)?;
                volumes.push(volume);
            }

            window.add_child(&renderer)?;
            renderers.push(renderer);
        }

        tracing::debug!(
            renderers = renderers.len(),
            volumes = volumes.len(),
            "demo scene built"
        );
        Ok(Self {
            window,
            renderers,
            volumes,
        })
    }

    /// Edit the scene between frames: toggle a volume's visibility on the
    /// configured cadence and drop the last renderer once.
    pub fn mutate(
        &mut self,
        view: &RenderView,
        frame: u64,
        config: &SceneConfig,
    ) -> anyhow::Result<()> {
        if config.toggle_every > 0 && frame % config.toggle_every == 0 && !self.volumes.is_empty() {
            let index = (frame / config.toggle_every) as usize % self.volumes.len();
            let volume = &self.volumes[index];
            let visible = volume.get_bool(props::VISIBILITY)?;
            volume.set(props::VISIBILITY, !visible)?;
            tracing::debug!(volume = %volume.get_text(props::NAME)?, visible = !visible, "toggled");
        }
        if config.drop_renderer_after > 0 && frame == config.drop_renderer_after {
            if let Some(renderer) = self.renderers.pop() {
                view.remove_renderer(&renderer)?;
                let id = renderer.id();
                self.volumes.retain(|v| v.parent().is_none_or(|p| p.id() != id));
                tracing::info!(renderer = %renderer.get_text(props::NAME)?, "renderer removed");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use sceneview_render::{RecordingContext, RenderConfig};

    #[test]
    fn grid_covers_the_window() {
        assert_eq!(grid_viewport(0, 1), Vec4::new(0.0, 0.0, 1.0, 1.0));
        // 2x2: index 1 is top right, index 2 bottom left.
        assert_eq!(grid_viewport(1, 4), Vec4::new(0.5, 0.5, 1.0, 1.0));
        assert_eq!(grid_viewport(2, 4), Vec4::new(0.0, 0.0, 0.5, 0.5));
        // 3 cells use 2 columns and 2 rows.
        assert_eq!(grid_viewport(2, 3), Vec4::new(0.0, 0.0, 0.5, 0.5));
    }

    #[test]
    fn build_creates_requested_shape() {
        let config = SceneConfig {
            renderers: 3,
            volumes_per_renderer: 2,
            ..SceneConfig::default()
        };
        let scene = DemoScene::build(&config).unwrap();
        assert_eq!(scene.window.child_count(), 3);
        assert_eq!(scene.volumes.len(), 6);
        // Camera plus two volumes.
        assert_eq!(scene.renderers[0].child_count(), 3);
        assert_eq!(
            scene.volumes[1].get_text(props::BLEND_MODE).unwrap(),
            "label"
        );
    }

    #[test]
    fn mutate_toggles_and_drops() {
        let config = SceneConfig {
            renderers: 2,
            volumes_per_renderer: 1,
            toggle_every: 1,
            drop_renderer_after: 2,
            ..SceneConfig::default()
        };
        let mut scene = DemoScene::build(&config).unwrap();
        let mut view = RenderView::new(
            scene.window.clone(),
            Arc::new(sceneview_render_wgpu::registry()),
            RenderConfig::default(),
        );
        view.set_surface(RecordingContext::shared(8, 8));
        view.render().unwrap();

        scene.mutate(&view, 1, &config).unwrap();
        assert!(!scene.volumes[1].get_bool(props::VISIBILITY).unwrap());

        scene.mutate(&view, 2, &config).unwrap();
        assert_eq!(scene.renderers.len(), 1);
        assert_eq!(scene.window.child_count(), 1);
        assert_eq!(scene.volumes.len(), 1);
        let stats = view.render().unwrap();
        // window, renderer, camera, volume, mapper
        assert_eq!(stats.view_nodes, 5);
    }
}

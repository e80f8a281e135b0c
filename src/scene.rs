//! Scene contents: the scattered donut group and the extruded text.
//!
//! The random scatter and its animation are plain CPU state in
//! [`ScatterField`]; [`Scene`] adds the GPU meshes, the shared material and
//! the instance buffer the render pass reads.

use anyhow::Result;
use cgmath::{Euler, Quaternion, Rad, Vector3};
use rand::Rng;
use wgpu::util::DeviceExt;

use crate::data_structures::instance::{Instance, InstanceRaw};
use crate::data_structures::mesh::{Mesh, torus};
use crate::material::MatcapMaterial;
use crate::render::DrawMatcap;
use crate::text::Typeface;
use crate::text::extrude::{ExtrudeOptions, extrude_text};

pub const DONUT_COUNT: usize = 100;
/// Fixed tilt of the scatter group around X, in radians.
pub const GROUP_TILT: f32 = 1.5;
/// The group gains this much Y rotation per second of elapsed time.
pub const GROUP_SPIN_RATE: f32 = 0.05;
/// Donut positions spread over a cube of this edge length around the origin.
pub const SCATTER_SPREAD: f32 = 10.0;

/// One hundred donuts in a tilted, slowly turning group.
///
/// Positions and scales are drawn once; rotations are a function of elapsed
/// time, so the animation is deterministic from the start timestamp.
#[derive(Debug, Clone)]
pub struct ScatterField {
    donuts: Vec<Instance>,
    group: Instance,
}

impl ScatterField {
    pub fn new(rng: &mut impl Rng) -> Self {
        let donuts = (0..DONUT_COUNT)
            .map(|_| {
                let mut donut = Instance::new();
                donut.position = Vector3::new(
                    (rng.r#gen::<f32>() - 0.5) * SCATTER_SPREAD,
                    (rng.r#gen::<f32>() - 0.5) * SCATTER_SPREAD,
                    (rng.r#gen::<f32>() - 0.5) * SCATTER_SPREAD,
                );
                donut.rotation = Quaternion::from(Euler::new(
                    Rad(rng.r#gen::<f32>() * std::f32::consts::PI),
                    Rad(rng.r#gen::<f32>() * std::f32::consts::PI),
                    Rad(0.0),
                ));
                let scale = rng.r#gen::<f32>();
                donut.scale = Vector3::new(scale, scale, scale);
                donut
            })
            .collect();

        let mut group = Instance::new();
        group.rotation = Quaternion::from(Euler::new(Rad(GROUP_TILT), Rad(0.0), Rad(0.0)));

        Self { donuts, group }
    }

    /// Advance the animation to `elapsed` seconds since start. Rotations are
    /// set absolutely, not accumulated, so time never drifts.
    pub fn update(&mut self, elapsed: f32) {
        self.group.rotation = Quaternion::from(Euler::new(
            Rad(GROUP_TILT),
            Rad(elapsed * GROUP_SPIN_RATE),
            Rad(0.0),
        ));
        let spin = Quaternion::from(Euler::new(Rad(elapsed), Rad(elapsed), Rad(elapsed)));
        for donut in &mut self.donuts {
            donut.rotation = spin;
        }
    }

    pub fn donuts(&self) -> &[Instance] {
        &self.donuts
    }

    pub fn group(&self) -> &Instance {
        &self.group
    }

    /// World-space instance data, group transform applied.
    pub fn instance_raws(&self) -> Vec<InstanceRaw> {
        self.donuts
            .iter()
            .map(|donut| (&self.group * donut).to_raw())
            .collect()
    }
}

/// Everything the render pass draws: donuts, text, and the one material
/// they all share.
pub struct Scene {
    pub field: ScatterField,
    pub material: MatcapMaterial,
    pub typeface: Option<Typeface>,
    pub extrude_options: ExtrudeOptions,
    donut_mesh: Mesh,
    /// The current text mesh, if any. Holding it here (rather than hunting
    /// for it in a child list) makes replacement trivially exact: assign and
    /// the old one is gone.
    text_mesh: Option<Mesh>,
    instance_buffer: wgpu::Buffer,
}

impl Scene {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, rng: &mut impl Rng) -> Self {
        let field = ScatterField::new(rng);
        let material = MatcapMaterial::new(device, queue);
        let donut_mesh = Mesh::from_data(device, &torus(0.3, 0.2, 20, 45), "donut");

        // One slot per donut plus a trailing identity slot for the text.
        let raws = vec![InstanceRaw::identity(); DONUT_COUNT + 1];
        let instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("scene_instance_buffer"),
            contents: bytemuck::cast_slice(&raws),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });

        Self {
            field,
            material,
            typeface: None,
            extrude_options: ExtrudeOptions::default(),
            donut_mesh,
            text_mesh: None,
            instance_buffer,
        }
    }

    /// Install the loaded typeface and build the first text mesh.
    pub fn set_typeface(
        &mut self,
        device: &wgpu::Device,
        typeface: Typeface,
        text: &str,
    ) -> Result<()> {
        self.typeface = Some(typeface);
        self.rebuild_text(device, text)
    }

    /// Replace the text mesh with a fresh extrusion of `text`. A no-op until
    /// the typeface has loaded; an empty extrusion removes the mesh.
    pub fn rebuild_text(&mut self, device: &wgpu::Device, text: &str) -> Result<()> {
        let Some(typeface) = &self.typeface else {
            return Ok(());
        };
        let data = extrude_text(typeface, text, &self.extrude_options)?;
        self.text_mesh = if data.is_empty() {
            None
        } else {
            Some(Mesh::from_data(device, &data, "text"))
        };
        Ok(())
    }

    /// Advance the animation and upload the per-instance transforms.
    pub fn update(&mut self, queue: &wgpu::Queue, elapsed: f32) {
        self.field.update(elapsed);
        let mut raws = self.field.instance_raws();
        raws.push(InstanceRaw::identity());
        queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&raws));
    }

    pub fn draw<'a>(
        &'a self,
        pass: &mut wgpu::RenderPass<'a>,
        camera_bind_group: &'a wgpu::BindGroup,
    ) {
        pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
        pass.draw_mesh_instanced(
            &self.donut_mesh,
            0..DONUT_COUNT as u32,
            &self.material.bind_group,
            camera_bind_group,
        );
        if let Some(text) = &self.text_mesh {
            pass.draw_mesh_instanced(
                text,
                DONUT_COUNT as u32..DONUT_COUNT as u32 + 1,
                &self.material.bind_group,
                camera_bind_group,
            );
        }
    }
}

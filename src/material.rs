//! The shared matcap material and the enumerated texture choices.
//!
//! Exactly one [`MatcapMaterial`] exists per scene. Every mesh binds the same
//! bind group each frame, so swapping the texture in place is immediately
//! visible on all meshes on the next render.

use std::fmt;

use crate::data_structures::texture::Texture;

/// One of the nine named matcap textures shipped with the demo.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureChoice {
    One,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
}

impl TextureChoice {
    pub const ALL: [TextureChoice; 9] = [
        TextureChoice::One,
        TextureChoice::Two,
        TextureChoice::Three,
        TextureChoice::Four,
        TextureChoice::Five,
        TextureChoice::Six,
        TextureChoice::Seven,
        TextureChoice::Eight,
        TextureChoice::Nine,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TextureChoice::One => "Texture 1",
            TextureChoice::Two => "Texture 2",
            TextureChoice::Three => "Texture 3",
            TextureChoice::Four => "Texture 4",
            TextureChoice::Five => "Texture 5",
            TextureChoice::Six => "Texture 6",
            TextureChoice::Seven => "Texture 7",
            TextureChoice::Eight => "Texture 8",
            TextureChoice::Nine => "Texture 9",
        }
    }

    /// Asset path relative to the assets directory.
    pub fn path(&self) -> &'static str {
        match self {
            TextureChoice::One => "textures/matcaps/1.png",
            TextureChoice::Two => "textures/matcaps/2.png",
            TextureChoice::Three => "textures/matcaps/3.png",
            TextureChoice::Four => "textures/matcaps/4.png",
            TextureChoice::Five => "textures/matcaps/5.png",
            TextureChoice::Six => "textures/matcaps/6.png",
            TextureChoice::Seven => "textures/matcaps/7.png",
            TextureChoice::Eight => "textures/matcaps/8.png",
            TextureChoice::Nine => "textures/matcaps/9.png",
        }
    }
}

impl Default for TextureChoice {
    fn default() -> Self {
        TextureChoice::Nine
    }
}

impl fmt::Display for TextureChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Bind group layout for the matcap texture and its sampler.
pub fn matcap_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
        label: Some("matcap_bind_group_layout"),
    })
}

/// The single appearance definition shared by every mesh in the scene.
pub struct MatcapMaterial {
    // Kept alive alongside the bind group that samples it.
    #[allow(unused)]
    texture: Texture,
    pub bind_group: wgpu::BindGroup,
    layout: wgpu::BindGroupLayout,
}

impl MatcapMaterial {
    /// Create the material with the generated neutral matcap. The real
    /// texture arrives later through [`set_texture`](Self::set_texture) once
    /// its load resolves.
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let layout = matcap_layout(device);
        let texture = Texture::create_default_matcap(device, queue);
        let bind_group = Self::mk_bind_group(device, &layout, &texture);
        Self {
            texture,
            bind_group,
            layout,
        }
    }

    /// Swap the matcap texture in place. Every mesh referencing this material
    /// reflects the new texture on the next frame.
    pub fn set_texture(&mut self, device: &wgpu::Device, texture: Texture) {
        self.bind_group = Self::mk_bind_group(device, &self.layout, &texture);
        self.texture = texture;
    }

    fn mk_bind_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        texture: &Texture,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&texture.sampler),
                },
            ],
            label: Some("matcap_bind_group"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn nine_distinct_choices() {
        let labels: HashSet<_> = TextureChoice::ALL.iter().map(|c| c.label()).collect();
        let paths: HashSet<_> = TextureChoice::ALL.iter().map(|c| c.path()).collect();
        assert_eq!(labels.len(), 9);
        assert_eq!(paths.len(), 9);
    }

    #[test]
    fn default_is_texture_nine() {
        let choice = TextureChoice::default();
        assert_eq!(choice.label(), "Texture 9");
        assert!(choice.path().ends_with("9.png"));
    }
}

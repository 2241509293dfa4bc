use crate::backend::AttributeLayout;
use bytemuck::{Pod, Zeroable};
use std::mem;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
}

impl Vertex {
    pub const ATTRIBUTES: [(AttributeLayout, &'static str); 1] = [(
        AttributeLayout {
            index: 0,
            components: 3,
            stride: mem::size_of::<Vertex>() as u32,
            offset: 0,
        },
        "position",
    )];
}

pub const TRIANGLE: [Vertex; 3] = [
    Vertex {
        position: [-0.5, -0.5, 0.0],
    },
    Vertex {
        position: [0.5, -0.5, 0.0],
    },
    Vertex {
        position: [0.0, 0.5, 0.0],
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tightly_packed() {
        let (layout, name) = Vertex::ATTRIBUTES[0];
        assert_eq!(name, "position");
        assert_eq!(layout.index, 0);
        assert_eq!(layout.components, 3);
        assert_eq!(layout.stride, 12);
        assert_eq!(layout.offset, 0);
        assert_eq!(bytemuck::cast_slice::<_, u8>(&TRIANGLE).len(), 36);
    }
}

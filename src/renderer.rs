use crate::backend::{Backend, Primitive};
use crate::error::Error;

mod buffer;
mod pipeline;
pub mod vertex;
mod vertex_array;

use pipeline::Pipeline;
use vertex::{Vertex, TRIANGLE};
use vertex_array::VertexArray;

pub const VERTEX_SHADER: &str = include_str!("data/triangle.vert");
pub const FRAGMENT_SHADER: &str = include_str!("data/triangle.frag");

const CLEAR_COLOR: [f32; 4] = [0.8, 0.8, 0.8, 1.0];

/// GPU objects for the fixed triangle. Dropping it releases them.
pub struct Renderer<'a, B: Backend> {
    backend: &'a B,
    pipeline: Pipeline<'a, B>,
    vertex_array: VertexArray<'a, B>,
}

impl<'a, B> Renderer<'a, B>
where
    B: Backend,
{
    pub fn new(backend: &'a B) -> Result<Self, Error> {
        let layouts: Vec<_> = Vertex::ATTRIBUTES.iter().map(|&(layout, _)| layout).collect();
        let names: Vec<_> = Vertex::ATTRIBUTES
            .iter()
            .map(|&(layout, name)| (layout.index, name))
            .collect();

        let vertex_array = VertexArray::new(backend, &TRIANGLE, &layouts)?;
        let pipeline = Pipeline::new(backend, VERTEX_SHADER, FRAGMENT_SHADER, &names)?;

        Ok(Renderer {
            backend,
            pipeline,
            vertex_array,
        })
    }

    pub fn render(&self) {
        self.backend.clear(CLEAR_COLOR);
        self.backend.use_program(Some(self.pipeline.program));
        self.backend.bind_vertex_array(Some(self.vertex_array.vao));
        self.backend
            .draw_arrays(Primitive::Triangles, 0, self.vertex_array.count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::recording::Recording;

    #[test]
    fn one_draw_of_three_vertices() {
        let backend = Recording::new();
        let renderer = Renderer::new(&backend).unwrap();
        assert!(backend.draws().is_empty());

        renderer.render();
        let draws = backend.draws();
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0].primitive, Primitive::Triangles);
        assert_eq!((draws[0].first, draws[0].count), (0, 3));
        assert!(draws[0].program_linked);
        assert_eq!(backend.clears(), 1);
        assert!(backend.errors().is_empty());
    }

    #[test]
    fn drop_releases_everything() {
        let backend = Recording::new();
        drop(Renderer::new(&backend).unwrap());
        assert_eq!(backend.live_objects(), 0);
        assert!(backend.errors().is_empty());
    }
}

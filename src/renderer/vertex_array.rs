use super::buffer::Buffer;
use crate::backend::{AttributeLayout, Backend};
use crate::error::Error;
use bytemuck::Pod;
use std::convert::TryFrom;

/// A vertex array object together with the buffer it sources from.
pub struct VertexArray<'a, B: Backend> {
    backend: &'a B,
    pub vao: B::VertexArray,
    pub buffer: Buffer<'a, B>,
    pub count: u32,
}

impl<'a, B: Backend> VertexArray<'a, B> {
    /// The VAO is bound before the buffer is created, so the layout is
    /// recorded against it while both are still bound.
    pub fn new<T: Pod>(
        backend: &'a B,
        content: &[T],
        attributes: &[AttributeLayout],
    ) -> Result<Self, Error> {
        let count = u32::try_from(content.len())
            .map_err(|_| Error::Allocation(format!("{} vertices", content.len())))?;
        let vao = backend.create_vertex_array().map_err(Error::Allocation)?;
        backend.bind_vertex_array(Some(vao));

        let buffer = match Buffer::new(backend, content) {
            Ok(buffer) => buffer,
            Err(err) => {
                backend.bind_vertex_array(None);
                backend.delete_vertex_array(vao);
                return Err(err);
            }
        };
        for layout in attributes {
            backend.vertex_attribute(layout);
        }
        log::debug!("vertex array {:?}: {} attribute(s)", vao, attributes.len());

        Ok(VertexArray {
            backend,
            vao,
            buffer,
            count,
        })
    }
}

impl<'a, B: Backend> Drop for VertexArray<'a, B> {
    fn drop(&mut self) {
        self.backend.delete_vertex_array(self.vao);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::recording::Recording;
    use crate::backend::Primitive;
    use crate::renderer::vertex::{Vertex, TRIANGLE};

    #[test]
    fn layout_is_attached_to_buffer() {
        let backend = Recording::new();
        let layouts = [Vertex::ATTRIBUTES[0].0];
        let vertex_array = VertexArray::new(&backend, &TRIANGLE, &layouts).unwrap();
        assert_eq!(vertex_array.count, 3);

        backend.draw_arrays(Primitive::Triangles, 0, vertex_array.count);
        let draw = &backend.draws()[0];
        assert_eq!(draw.attributes.len(), 1);
        assert_eq!(draw.attributes[0].layout, layouts[0]);
        assert_eq!(draw.attributes[0].buffer, vertex_array.buffer.buf);
    }

    #[test]
    fn releases_both_objects() {
        let backend = Recording::new();
        drop(VertexArray::new(&backend, &TRIANGLE, &[]).unwrap());
        assert_eq!(backend.objects_created(), 2);
        assert_eq!(backend.live_objects(), 0);
        assert!(backend.errors().is_empty());
    }

    #[test]
    fn empty_content_releases_vertex_array() {
        let backend = Recording::new();
        let result = VertexArray::new(&backend, &[] as &[Vertex], &[]);
        assert!(matches!(result, Err(Error::Allocation(_))));
        assert_eq!(backend.objects_created(), 1);
        assert_eq!(backend.live_objects(), 0);
        assert!(backend.errors().is_empty());
    }
}

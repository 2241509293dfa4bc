use crate::backend::Backend;
use crate::error::Error;
use bytemuck::Pod;
use std::mem;

/// A static array buffer filled from `content` at creation.
pub struct Buffer<'a, B: Backend> {
    backend: &'a B,
    pub buf: B::Buffer,
    pub len: usize,
}

impl<'a, B: Backend> Buffer<'a, B> {
    pub fn new<T: Pod>(backend: &'a B, content: &[T]) -> Result<Self, Error> {
        let len = content.len() * mem::size_of::<T>();
        if len == 0 {
            return Err(Error::Allocation("empty vertex buffer".to_string()));
        }

        let buf = backend.create_buffer().map_err(Error::Allocation)?;
        backend.upload_array_buffer(buf, bytemuck::cast_slice(content));
        log::debug!("uploaded {} bytes into {:?}", len, buf);

        Ok(Buffer { backend, buf, len })
    }
}

impl<'a, B: Backend> Drop for Buffer<'a, B> {
    fn drop(&mut self) {
        self.backend.delete_buffer(self.buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::recording::Recording;

    #[test]
    fn uploads_content_bytes() {
        let backend = Recording::new();
        let content = [1.0f32, 2.0, 3.0];
        {
            let buffer = Buffer::new(&backend, &content).unwrap();
            assert_eq!(buffer.len, 12);
            assert_eq!(backend.live_objects(), 1);
        }
        assert_eq!(backend.uploads(), vec![bytemuck::cast_slice::<_, u8>(&content).to_vec()]);
        assert_eq!(backend.live_objects(), 0);
        assert!(backend.errors().is_empty());
    }

    #[test]
    fn empty_content_is_rejected() {
        let backend = Recording::new();
        let result = Buffer::new(&backend, &[] as &[f32]);
        assert!(matches!(result, Err(Error::Allocation(_))));
        assert_eq!(backend.objects_created(), 0);
    }
}

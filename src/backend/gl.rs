use super::{AttributeLayout, Backend, Primitive, ShaderStage};
use glow::HasContext;
use std::os::raw::c_void;

/// [`Backend`] over a `glow` context.
pub struct Gl {
    context: glow::Context,
}

impl Gl {
    /// # Safety
    ///
    /// The context the loader resolves against must be current on this
    /// thread for the whole lifetime of the returned value.
    pub unsafe fn from_loader_function<F>(loader: F) -> Self
    where
        F: FnMut(&str) -> *const c_void,
    {
        Gl {
            context: glow::Context::from_loader_function(loader),
        }
    }

    pub fn version(&self) -> String {
        unsafe { self.context.get_parameter_string(glow::VERSION) }
    }
}

fn stage_enum(stage: ShaderStage) -> u32 {
    match stage {
        ShaderStage::Vertex => glow::VERTEX_SHADER,
        ShaderStage::Fragment => glow::FRAGMENT_SHADER,
    }
}

fn primitive_enum(primitive: Primitive) -> u32 {
    match primitive {
        Primitive::Triangles => glow::TRIANGLES,
    }
}

impl Backend for Gl {
    type Shader = glow::Shader;
    type Program = glow::Program;
    type Buffer = glow::Buffer;
    type VertexArray = glow::VertexArray;

    fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, String> {
        unsafe { self.context.create_shader(stage_enum(stage)) }
    }

    fn compile_shader(&self, shader: Self::Shader, source: &str) -> Result<(), String> {
        unsafe {
            self.context.shader_source(shader, source);
            self.context.compile_shader(shader);
            if self.context.get_shader_compile_status(shader) {
                Ok(())
            } else {
                Err(self.context.get_shader_info_log(shader))
            }
        }
    }

    fn delete_shader(&self, shader: Self::Shader) {
        unsafe { self.context.delete_shader(shader) }
    }

    fn create_program(&self) -> Result<Self::Program, String> {
        unsafe { self.context.create_program() }
    }

    fn link_program(
        &self,
        program: Self::Program,
        shaders: &[Self::Shader],
        attributes: &[(u32, &str)],
    ) -> Result<(), String> {
        unsafe {
            for &shader in shaders {
                self.context.attach_shader(program, shader);
            }
            for &(index, name) in attributes {
                self.context.bind_attrib_location(program, index, name);
            }
            self.context.link_program(program);
            let linked = self.context.get_program_link_status(program);
            for &shader in shaders {
                self.context.detach_shader(program, shader);
            }
            if linked {
                Ok(())
            } else {
                Err(self.context.get_program_info_log(program))
            }
        }
    }

    fn use_program(&self, program: Option<Self::Program>) {
        unsafe { self.context.use_program(program) }
    }

    fn delete_program(&self, program: Self::Program) {
        unsafe { self.context.delete_program(program) }
    }

    fn create_buffer(&self) -> Result<Self::Buffer, String> {
        unsafe { self.context.create_buffer() }
    }

    fn upload_array_buffer(&self, buffer: Self::Buffer, data: &[u8]) {
        unsafe {
            self.context.bind_buffer(glow::ARRAY_BUFFER, Some(buffer));
            self.context
                .buffer_data_u8_slice(glow::ARRAY_BUFFER, data, glow::STATIC_DRAW);
        }
    }

    fn delete_buffer(&self, buffer: Self::Buffer) {
        unsafe { self.context.delete_buffer(buffer) }
    }

    fn create_vertex_array(&self) -> Result<Self::VertexArray, String> {
        unsafe { self.context.create_vertex_array() }
    }

    fn bind_vertex_array(&self, vertex_array: Option<Self::VertexArray>) {
        unsafe { self.context.bind_vertex_array(vertex_array) }
    }

    fn vertex_attribute(&self, layout: &AttributeLayout) {
        unsafe {
            self.context.vertex_attrib_pointer_f32(
                layout.index,
                layout.components as i32,
                glow::FLOAT,
                false,
                layout.stride as i32,
                layout.offset as i32,
            );
            self.context.enable_vertex_attrib_array(layout.index);
        }
    }

    fn delete_vertex_array(&self, vertex_array: Self::VertexArray) {
        unsafe { self.context.delete_vertex_array(vertex_array) }
    }

    fn clear(&self, color: [f32; 4]) {
        unsafe {
            self.context
                .clear_color(color[0], color[1], color[2], color[3]);
            self.context.clear(glow::COLOR_BUFFER_BIT);
        }
    }

    fn draw_arrays(&self, primitive: Primitive, first: u32, count: u32) {
        unsafe {
            self.context
                .draw_arrays(primitive_enum(primitive), first as i32, count as i32)
        }
    }
}

use crate::backend::{Backend, ShaderStage};
use crate::error::Error;

/// A linked shader program. Stage objects do not outlive construction.
pub struct Pipeline<'a, B: Backend> {
    backend: &'a B,
    pub program: B::Program,
}

impl<'a, B: Backend> Pipeline<'a, B> {
    pub fn new(
        backend: &'a B,
        vs_source: &str,
        fs_source: &str,
        attributes: &[(u32, &str)],
    ) -> Result<Self, Error> {
        let vs = Self::compile(backend, ShaderStage::Vertex, vs_source)?;
        let fs = match Self::compile(backend, ShaderStage::Fragment, fs_source) {
            Ok(fs) => fs,
            Err(err) => {
                backend.delete_shader(vs);
                return Err(err);
            }
        };

        let program = Self::link(backend, &[vs, fs], attributes);

        backend.delete_shader(vs);
        backend.delete_shader(fs);

        let program = program?;
        log::info!("linked program {:?}", program);
        Ok(Pipeline { backend, program })
    }

    fn compile(backend: &B, stage: ShaderStage, source: &str) -> Result<B::Shader, Error> {
        let shader = backend.create_shader(stage).map_err(Error::Allocation)?;
        match backend.compile_shader(shader, source) {
            Ok(()) => {
                log::debug!("compiled {} shader {:?}", stage, shader);
                Ok(shader)
            }
            Err(log) => {
                backend.delete_shader(shader);
                Err(Error::Compile { stage, log })
            }
        }
    }

    fn link(
        backend: &B,
        shaders: &[B::Shader],
        attributes: &[(u32, &str)],
    ) -> Result<B::Program, Error> {
        let program = backend.create_program().map_err(Error::Allocation)?;
        match backend.link_program(program, shaders, attributes) {
            Ok(()) => Ok(program),
            Err(log) => {
                backend.delete_program(program);
                Err(Error::Link(log))
            }
        }
    }
}

impl<'a, B: Backend> Drop for Pipeline<'a, B> {
    fn drop(&mut self) {
        self.backend.delete_program(self.program);
    }
}

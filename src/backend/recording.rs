//! An instrumented [`Backend`] for running the bootstrap without a GPU.
//!
//! `Recording` behaves like a strict driver: it hands out object names,
//! validates shader sources against their stage, refuses incomplete
//! programs and reports ordering mistakes (attribute layout without a
//! bound vertex array, draws without a linked program). Everything it
//! sees is kept for later inspection, including objects that have since
//! been deleted.

use super::{AttributeLayout, Backend, Primitive, ShaderStage};
use crate::error::Error;
use crate::window::Surface;
use std::cell::{Cell, RefCell};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Shader(ShaderStage),
    Program,
    Buffer,
    VertexArray,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundAttribute {
    pub layout: AttributeLayout,
    pub buffer: Handle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    pub primitive: Primitive,
    pub first: u32,
    pub count: u32,
    pub program_linked: bool,
    pub attributes: Vec<BoundAttribute>,
}

#[derive(Debug)]
struct Object {
    kind: Kind,
    deleted: bool,
    // compiled for shaders, linked for programs
    ready: bool,
    data: Vec<u8>,
    attributes: Vec<BoundAttribute>,
    bindings: Vec<(u32, String)>,
}

impl Object {
    fn new(kind: Kind) -> Self {
        Object {
            kind,
            deleted: false,
            ready: false,
            data: Vec::new(),
            attributes: Vec::new(),
            bindings: Vec::new(),
        }
    }
}

#[derive(Debug, Default)]
struct State {
    objects: Vec<Object>,
    array_buffer: Option<Handle>,
    vertex_array: Option<Handle>,
    program: Option<Handle>,
    clears: usize,
    draws: Vec<DrawCall>,
    errors: Vec<String>,
    fail_compile: Option<ShaderStage>,
    fail_link: bool,
}

impl State {
    fn create(&mut self, kind: Kind) -> Handle {
        self.objects.push(Object::new(kind));
        Handle(self.objects.len() - 1)
    }

    fn object(
        &mut self,
        handle: Handle,
        expected: fn(&Kind) -> bool,
        op: &str,
    ) -> Option<&mut Object> {
        match self.objects.get_mut(handle.0) {
            Some(object) if !object.deleted && expected(&object.kind) => Some(object),
            _ => {
                self.errors
                    .push(format!("{}: invalid object {:?}", op, handle));
                None
            }
        }
    }

    fn delete(&mut self, handle: Handle, expected: fn(&Kind) -> bool, op: &str) {
        if let Some(object) = self.object(handle, expected, op) {
            object.deleted = true;
        }
    }
}

fn is_shader(kind: &Kind) -> bool {
    matches!(kind, Kind::Shader(_))
}

fn is_program(kind: &Kind) -> bool {
    *kind == Kind::Program
}

fn is_buffer(kind: &Kind) -> bool {
    *kind == Kind::Buffer
}

fn is_vertex_array(kind: &Kind) -> bool {
    *kind == Kind::VertexArray
}

/// Checks the stage-specific rules a GLSL compiler would enforce on these
/// sources: a vertex stage must write `gl_Position`, which does not exist
/// in a fragment stage.
fn validate(stage: ShaderStage, source: &str) -> Result<(), String> {
    if !source.contains("void main") {
        return Err(format!("{} shader has no main function", stage));
    }
    let uses_position = source.contains("gl_Position");
    match stage {
        ShaderStage::Vertex if !uses_position => {
            Err("vertex shader does not write gl_Position".to_string())
        }
        ShaderStage::Fragment if uses_position => {
            Err("'gl_Position' : undeclared identifier in fragment shader".to_string())
        }
        _ => Ok(()),
    }
}

#[derive(Debug, Default)]
pub struct Recording {
    state: RefCell<State>,
}

impl Recording {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every compilation of `stage` fails, whatever the source.
    pub fn with_compile_failure(stage: ShaderStage) -> Self {
        let recording = Self::default();
        recording.state.borrow_mut().fail_compile = Some(stage);
        recording
    }

    /// Every link fails, even with a complete set of compiled stages.
    pub fn with_link_failure() -> Self {
        let recording = Self::default();
        recording.state.borrow_mut().fail_link = true;
        recording
    }

    pub fn draws(&self) -> Vec<DrawCall> {
        self.state.borrow().draws.clone()
    }

    pub fn clears(&self) -> usize {
        self.state.borrow().clears
    }

    /// Programs that reached the linked state, deleted or not.
    pub fn programs_linked(&self) -> usize {
        self.state
            .borrow()
            .objects
            .iter()
            .filter(|o| o.kind == Kind::Program && o.ready)
            .count()
    }

    pub fn attribute_bindings(&self) -> Vec<(u32, String)> {
        self.state
            .borrow()
            .objects
            .iter()
            .filter(|o| o.kind == Kind::Program && o.ready)
            .flat_map(|o| o.bindings.iter().cloned())
            .collect()
    }

    /// Contents of every buffer ever created, in creation order.
    pub fn uploads(&self) -> Vec<Vec<u8>> {
        self.state
            .borrow()
            .objects
            .iter()
            .filter(|o| o.kind == Kind::Buffer)
            .map(|o| o.data.clone())
            .collect()
    }

    pub fn objects_created(&self) -> usize {
        self.state.borrow().objects.len()
    }

    pub fn live_objects(&self) -> usize {
        self.state
            .borrow()
            .objects
            .iter()
            .filter(|o| !o.deleted)
            .count()
    }

    pub fn errors(&self) -> Vec<String> {
        self.state.borrow().errors.clone()
    }
}

impl Backend for Recording {
    type Shader = Handle;
    type Program = Handle;
    type Buffer = Handle;
    type VertexArray = Handle;

    fn create_shader(&self, stage: ShaderStage) -> Result<Handle, String> {
        Ok(self.state.borrow_mut().create(Kind::Shader(stage)))
    }

    fn compile_shader(&self, shader: Handle, source: &str) -> Result<(), String> {
        let mut state = self.state.borrow_mut();
        let fail = state.fail_compile;
        let object = state
            .object(shader, is_shader, "compile_shader")
            .ok_or_else(|| format!("invalid shader {:?}", shader))?;
        let result = match object.kind {
            Kind::Shader(stage) if fail == Some(stage) => {
                Err(format!("{} shader compilation rejected", stage))
            }
            Kind::Shader(stage) => validate(stage, source),
            _ => unreachable!(),
        };
        object.ready = result.is_ok();
        result
    }

    fn delete_shader(&self, shader: Handle) {
        self.state
            .borrow_mut()
            .delete(shader, is_shader, "delete_shader");
    }

    fn create_program(&self) -> Result<Handle, String> {
        Ok(self.state.borrow_mut().create(Kind::Program))
    }

    fn link_program(
        &self,
        program: Handle,
        shaders: &[Handle],
        attributes: &[(u32, &str)],
    ) -> Result<(), String> {
        let mut state = self.state.borrow_mut();
        let fail = state.fail_link;
        let mut stages = Vec::with_capacity(shaders.len());
        for &shader in shaders {
            match state.object(shader, is_shader, "link_program") {
                Some(Object {
                    kind: Kind::Shader(stage),
                    ready: true,
                    ..
                }) => stages.push(*stage),
                Some(_) => return Err(format!("shader {:?} is not compiled", shader)),
                None => return Err(format!("invalid shader {:?}", shader)),
            }
        }
        let count = |wanted: ShaderStage| stages.iter().filter(|&&s| s == wanted).count();
        let complete =
            stages.len() == 2 && count(ShaderStage::Vertex) == 1 && count(ShaderStage::Fragment) == 1;

        let object = state
            .object(program, is_program, "link_program")
            .ok_or_else(|| format!("invalid program {:?}", program))?;
        object.ready = complete && !fail;
        if fail {
            Err("program link rejected".to_string())
        } else if complete {
            object.bindings = attributes
                .iter()
                .map(|&(index, name)| (index, name.to_string()))
                .collect();
            Ok(())
        } else {
            Err(format!(
                "expected one vertex and one fragment stage, got {:?}",
                stages
            ))
        }
    }

    fn use_program(&self, program: Option<Handle>) {
        let mut state = self.state.borrow_mut();
        if let Some(program) = program {
            if state.object(program, is_program, "use_program").is_none() {
                return;
            }
        }
        state.program = program;
    }

    fn delete_program(&self, program: Handle) {
        let mut state = self.state.borrow_mut();
        state.delete(program, is_program, "delete_program");
        if state.program == Some(program) {
            state.program = None;
        }
    }

    fn create_buffer(&self) -> Result<Handle, String> {
        Ok(self.state.borrow_mut().create(Kind::Buffer))
    }

    fn upload_array_buffer(&self, buffer: Handle, data: &[u8]) {
        let mut state = self.state.borrow_mut();
        if let Some(object) = state.object(buffer, is_buffer, "upload_array_buffer") {
            object.data = data.to_vec();
            state.array_buffer = Some(buffer);
        }
    }

    fn delete_buffer(&self, buffer: Handle) {
        let mut state = self.state.borrow_mut();
        state.delete(buffer, is_buffer, "delete_buffer");
        if state.array_buffer == Some(buffer) {
            state.array_buffer = None;
        }
    }

    fn create_vertex_array(&self) -> Result<Handle, String> {
        Ok(self.state.borrow_mut().create(Kind::VertexArray))
    }

    fn bind_vertex_array(&self, vertex_array: Option<Handle>) {
        let mut state = self.state.borrow_mut();
        if let Some(vertex_array) = vertex_array {
            if state
                .object(vertex_array, is_vertex_array, "bind_vertex_array")
                .is_none()
            {
                return;
            }
        }
        state.vertex_array = vertex_array;
    }

    fn vertex_attribute(&self, layout: &AttributeLayout) {
        let mut state = self.state.borrow_mut();
        let (vertex_array, buffer) = match (state.vertex_array, state.array_buffer) {
            (Some(vertex_array), Some(buffer)) => (vertex_array, buffer),
            _ => {
                state.errors.push(
                    "vertex_attribute: no vertex array or array buffer bound".to_string(),
                );
                return;
            }
        };
        if let Some(object) = state.object(vertex_array, is_vertex_array, "vertex_attribute") {
            object.attributes.push(BoundAttribute {
                layout: *layout,
                buffer,
            });
        }
    }

    fn delete_vertex_array(&self, vertex_array: Handle) {
        let mut state = self.state.borrow_mut();
        state.delete(vertex_array, is_vertex_array, "delete_vertex_array");
        if state.vertex_array == Some(vertex_array) {
            state.vertex_array = None;
        }
    }

    fn clear(&self, _color: [f32; 4]) {
        self.state.borrow_mut().clears += 1;
    }

    fn draw_arrays(&self, primitive: Primitive, first: u32, count: u32) {
        let mut state = self.state.borrow_mut();
        let program_linked = state
            .program
            .and_then(|p| state.objects.get(p.0))
            .map_or(false, |o| o.ready && !o.deleted);
        let attributes = state
            .vertex_array
            .and_then(|v| state.objects.get(v.0))
            .map(|o| o.attributes.clone())
            .unwrap_or_default();

        if !program_linked {
            state
                .errors
                .push("draw_arrays: no linked program in use".to_string());
        }
        if attributes.is_empty() {
            state
                .errors
                .push("draw_arrays: no vertex attributes enabled".to_string());
        }
        state.draws.push(DrawCall {
            primitive,
            first,
            count,
            program_linked,
            attributes,
        });
    }
}

/// A [`Surface`] whose back buffer is a [`Recording`].
#[derive(Debug, Default)]
pub struct Headless {
    backend: Recording,
    presents: Cell<usize>,
}

impl Headless {
    pub fn new(backend: Recording) -> Self {
        Headless {
            backend,
            presents: Cell::new(0),
        }
    }

    pub fn presents(&self) -> usize {
        self.presents.get()
    }
}

impl Surface for Headless {
    type Backend = Recording;

    fn backend(&self) -> &Recording {
        &self.backend
    }

    fn present(&self) -> Result<(), Error> {
        self.presents.set(self.presents.get() + 1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VERTEX: &str = "void main() { gl_Position = vec4(0.0); }";
    const FRAGMENT: &str = "out vec4 c; void main() { c = vec4(1.0); }";

    fn compiled(backend: &Recording, stage: ShaderStage, source: &str) -> Handle {
        let shader = backend.create_shader(stage).unwrap();
        backend.compile_shader(shader, source).unwrap();
        shader
    }

    #[test]
    fn stage_rules() {
        let backend = Recording::new();
        let shader = backend.create_shader(ShaderStage::Vertex).unwrap();
        assert!(backend.compile_shader(shader, FRAGMENT).is_err());
        assert!(backend.compile_shader(shader, VERTEX).is_ok());

        let shader = backend.create_shader(ShaderStage::Fragment).unwrap();
        assert!(backend.compile_shader(shader, VERTEX).is_err());
        assert!(backend.compile_shader(shader, "out vec4 c;").is_err());
        assert!(backend.compile_shader(shader, FRAGMENT).is_ok());
    }

    #[test]
    fn link_requires_one_of_each_stage() {
        let backend = Recording::new();
        let a = compiled(&backend, ShaderStage::Vertex, VERTEX);
        let b = compiled(&backend, ShaderStage::Vertex, VERTEX);
        let program = backend.create_program().unwrap();
        assert!(backend.link_program(program, &[a, b], &[]).is_err());

        let fragment = compiled(&backend, ShaderStage::Fragment, FRAGMENT);
        assert!(backend.link_program(program, &[a, fragment], &[]).is_ok());
        assert_eq!(backend.programs_linked(), 1);
    }

    #[test]
    fn link_rejects_uncompiled_shader() {
        let backend = Recording::new();
        let vertex = compiled(&backend, ShaderStage::Vertex, VERTEX);
        let fragment = backend.create_shader(ShaderStage::Fragment).unwrap();
        let program = backend.create_program().unwrap();
        assert!(backend
            .link_program(program, &[vertex, fragment], &[])
            .is_err());
        assert_eq!(backend.programs_linked(), 0);
    }

    #[test]
    fn injected_link_failure() {
        let backend = Recording::with_link_failure();
        let vertex = compiled(&backend, ShaderStage::Vertex, VERTEX);
        let fragment = compiled(&backend, ShaderStage::Fragment, FRAGMENT);
        let program = backend.create_program().unwrap();
        assert!(backend
            .link_program(program, &[vertex, fragment], &[])
            .is_err());
        assert_eq!(backend.programs_linked(), 0);
    }

    #[test]
    fn attribute_needs_bound_objects() {
        let backend = Recording::new();
        let layout = AttributeLayout {
            index: 0,
            components: 3,
            stride: 12,
            offset: 0,
        };
        backend.vertex_attribute(&layout);
        assert_eq!(backend.errors().len(), 1);

        let vertex_array = backend.create_vertex_array().unwrap();
        backend.bind_vertex_array(Some(vertex_array));
        let buffer = backend.create_buffer().unwrap();
        backend.upload_array_buffer(buffer, &[0; 12]);
        backend.vertex_attribute(&layout);
        assert_eq!(backend.errors().len(), 1);
    }

    #[test]
    fn deleted_objects_are_invalid() {
        let backend = Recording::new();
        let buffer = backend.create_buffer().unwrap();
        backend.delete_buffer(buffer);
        backend.upload_array_buffer(buffer, &[1, 2, 3]);
        backend.delete_buffer(buffer);
        assert_eq!(backend.errors().len(), 2);
        assert_eq!(backend.live_objects(), 0);
        assert_eq!(backend.uploads(), vec![Vec::<u8>::new()]);
    }

    #[test]
    fn draw_without_program_is_flagged() {
        let backend = Recording::new();
        backend.draw_arrays(Primitive::Triangles, 0, 3);
        let draws = backend.draws();
        assert_eq!(draws.len(), 1);
        assert!(!draws[0].program_linked);
        assert_eq!(backend.errors().len(), 2);
    }

    #[test]
    fn injected_compile_failure() {
        let backend = Recording::with_compile_failure(ShaderStage::Fragment);
        compiled(&backend, ShaderStage::Vertex, VERTEX);
        let shader = backend.create_shader(ShaderStage::Fragment).unwrap();
        assert!(backend.compile_shader(shader, FRAGMENT).is_err());
    }
}

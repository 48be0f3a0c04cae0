use crate::rigid_body::RigidBody;

/// Per-body data for an instanced draw: just the model matrix.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct BodyInstance {
    pub model: [[f32; 4]; 4],
}

impl From<&RigidBody> for BodyInstance {
    fn from(body: &RigidBody) -> Self {
        BodyInstance {
            model: body.opengl_matrix(),
        }
    }
}

/// Raw bytes for an instance buffer upload.
pub fn instance_bytes(instances: &[BodyInstance]) -> &[u8] {
    bytemuck::cast_slice(instances)
}

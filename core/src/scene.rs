use glam::Vec3;

/// The vertex positions drawn every frame. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    vertices: [Vec3; 3],
}

impl Scene {
    pub fn new(vertices: [Vec3; 3]) -> Self {
        Self { vertices }
    }

    pub fn triangle() -> Self {
        Self::new([
            Vec3::new(0.0, 0.5, 0.0),
            Vec3::new(-0.5, -0.5, 0.0),
            Vec3::new(0.5, -0.5, 0.0),
        ])
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    pub fn vertex_count(&self) -> i32 {
        self.vertices.len() as i32
    }

    /// Tightly packed `[x, y, z]` floats, ready for `glBufferData`.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Byte distance between consecutive positions.
    pub fn stride(&self) -> i32 {
        std::mem::size_of::<Vec3>() as i32
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::triangle()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::test_utils::fixtures;

    #[rstest]
    fn triangle_layout() {
        let scene = fixtures::scene::triangle();
        assert_eq!(scene.vertex_count(), 3);
        assert_eq!(scene.stride(), 12);
        assert_eq!(scene.as_bytes().len(), 36);
        assert_eq!(scene.vertices()[0], Vec3::new(0.0, 0.5, 0.0));
    }

    #[rstest]
    fn bytes_are_packed_xyz() {
        let scene = fixtures::scene::flipped_triangle();
        let floats: &[f32] = bytemuck::cast_slice(scene.as_bytes());
        assert_eq!(floats, &[0.0, -0.5, 0.0, 0.5, 0.5, 0.0, -0.5, 0.5, 0.0]);
    }
}

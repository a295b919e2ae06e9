pub mod shaders {
    use std::path::PathBuf;

    /// Path of a shader source under `core/tests/shaders`.
    pub fn path(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("shaders")
            .join(name)
    }

    pub fn valid_vertex() -> PathBuf {
        path("triangle.vs")
    }

    pub fn valid_fragment() -> PathBuf {
        path("triangle.fs")
    }

    pub fn syntax_error_vertex() -> PathBuf {
        path("syntax_error.vs")
    }

    pub fn syntax_error_fragment() -> PathBuf {
        path("syntax_error.fs")
    }

    pub fn not_utf8_vertex() -> PathBuf {
        path("not_utf8.vs")
    }

    pub const MINIMAL_VERTEX: &str = "attribute vec3 a_posL;
void main()
{
    gl_Position = vec4(a_posL, 1.0);
}
";

    pub const MINIMAL_FRAGMENT: &str = "precision mediump float;
void main()
{
    gl_FragColor = vec4(1.0, 0.0, 0.0, 1.0);
}
";
}

pub mod scene {
    use glam::Vec3;

    use crate::scene::Scene;

    pub fn triangle() -> Scene {
        Scene::triangle()
    }

    pub fn flipped_triangle() -> Scene {
        Scene::new([
            Vec3::new(0.0, -0.5, 0.0),
            Vec3::new(0.5, 0.5, 0.0),
            Vec3::new(-0.5, 0.5, 0.0),
        ])
    }
}

extern crate triangle_core;

mod tests {
    use std::rc::Rc;

    use triangle_core::{
        scene::Scene,
        shaders::{POSITION_ATTRIBUTE, ShaderStage, Shaders},
        test_utils::{fixtures, mock_gl::MockGl},
    };

    #[test]
    fn minimal_sources_link_and_draw_without_error() {
        let gl = Rc::new(MockGl::new());
        let shaders = Shaders::from_sources(
            &gl,
            fixtures::shaders::MINIMAL_VERTEX,
            fixtures::shaders::MINIMAL_FRAGMENT,
        )
        .unwrap();

        let position = shaders.position_attribute();
        assert!(position.is_some(), "a_posL should be an active attribute");

        let scene = Scene::triangle();
        gl.draw_triangles(shaders.program(), position, scene.vertex_count());
        assert_eq!(gl.get_error(), glow::NO_ERROR);
    }

    #[test]
    fn files_on_disk_behave_like_literal_sources() {
        let gl = Rc::new(MockGl::new());
        let from_files = Shaders::init(
            &gl,
            fixtures::shaders::valid_vertex(),
            fixtures::shaders::valid_fragment(),
        )
        .unwrap();
        let from_sources = Shaders::from_sources(
            &gl,
            fixtures::shaders::MINIMAL_VERTEX,
            fixtures::shaders::MINIMAL_FRAGMENT,
        )
        .unwrap();

        assert_ne!(from_files.program(), from_sources.program());
        assert_eq!(
            from_files.attribute_location(POSITION_ATTRIBUTE),
            from_sources.attribute_location(POSITION_ATTRIBUTE)
        );
    }

    #[test]
    fn nothing_leaks_across_repeated_failures() {
        let gl = Rc::new(MockGl::new());

        for _ in 0..4 {
            let vertex_failure = Shaders::init(
                &gl,
                fixtures::shaders::syntax_error_vertex(),
                fixtures::shaders::valid_fragment(),
            );
            assert_eq!(vertex_failure.unwrap_err().code(), -1);

            let fragment_failure = Shaders::init(
                &gl,
                fixtures::shaders::valid_vertex(),
                fixtures::shaders::syntax_error_fragment(),
            );
            assert_eq!(fragment_failure.unwrap_err().code(), -2);
        }

        assert_eq!(gl.created_shaders_of(ShaderStage::Fragment), 4);
        assert_eq!(gl.live_shaders(None), 0);
        assert_eq!(gl.live_programs(), 0);
    }

    #[test]
    fn program_survives_until_dropped() {
        let gl = Rc::new(MockGl::new());
        let shaders = Shaders::init(
            &gl,
            fixtures::shaders::valid_vertex(),
            fixtures::shaders::valid_fragment(),
        )
        .unwrap();
        let program = shaders.program();

        assert!(gl.is_live_program(program));
        drop(shaders);
        assert!(!gl.is_live_program(program));

        gl.draw_triangles(program, Some(0), 3);
        assert_eq!(gl.get_error(), glow::INVALID_OPERATION);
    }
}

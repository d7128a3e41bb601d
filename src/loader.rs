use std::fs;
use std::path::Path;

use log::{ debug, error };
use serde::{ Serialize, Deserialize };

use crate::error::{ Error, Result };
use crate::vector::Vector3;
use crate::color::Color;
use crate::camera::Camera;
use crate::scene::Scene;
use crate::shape::Shape;
use crate::light::{ Light, Material, Attenuation };
use crate::transform::{ AffineTransform, TransformError };
use crate::consts::DEFAULT_MAX_DEPTH;

/// A JSON scene description.
///
/// Besides the camera and lights, a description holds an ordered list of
/// `commands`. Commands are executed in order against a material state and a
/// transform builder; every `sphere` and `tri` command creates a shape with
/// the material and transform in effect at that point.
///
/// ```
/// # use whitted_tracer::loader::SceneDescription;
/// let scene = SceneDescription::from_str(r#"{
///     "size": [64, 48],
///     "camera": {
///         "eye": [0, 0, 5], "look_at": [0, 0, 0], "up": [0, 1, 0],
///         "fovy": 45
///     },
///     "lights": [{ "type": "point", "position": [4, 4, 4], "color": [1, 1, 1] }],
///     "commands": [
///         { "diffuse": [1, 0, 0] },
///         { "sphere": { "center": [0, 0, 0], "radius": 1 } }
///     ]
/// }"#).unwrap().build().unwrap();
///
/// assert_eq!(scene.width(), 64);
/// assert_eq!(scene.objects().len(), 1);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneDescription {
    /// Image width and height, in pixels.
    pub size: [usize; 2],

    #[serde(default = "default_max_depth")]
    pub maxdepth: usize,

    /// Preferred output file name.
    #[serde(default)]
    pub output: Option<String>,

    pub camera: CameraDescription,

    #[serde(default)]
    pub attenuation: Attenuation,

    /// Global ambient term, and the initial ambient of the material state.
    #[serde(default = "default_ambient")]
    pub ambient: Color,

    #[serde(default)]
    pub lights: Vec<LightDescription>,

    /// Triangle vertices, referenced by index from `tri` commands.
    #[serde(default)]
    pub vertices: Vec<Vector3>,

    #[serde(default)]
    pub commands: Vec<Command>,
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

fn default_ambient() -> Color {
    Color::rgb(0.2, 0.2, 0.2)
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CameraDescription {
    pub eye: Vector3,
    pub look_at: Vector3,
    pub up: Vector3,

    /// Vertical field of view, in degrees.
    pub fovy: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LightDescription {
    /// `direction` points towards the light.
    Directional { direction: Vector3, color: Color },
    Point { position: Vector3, color: Color },
}

/// A scene-building command.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    Translate([f64; 3]),
    Rotate { axis: Vector3, degrees: f64 },
    Scale([f64; 3]),
    PushTransform,
    PopTransform,

    Ambient(Color),
    Diffuse(Color),
    Specular(Color),
    Shininess(f64),
    Emission(Color),

    Sphere { center: Vector3, radius: f64 },

    /// Indices into `vertices`, counter-clockwise.
    Tri([usize; 3]),
}

fn invalid<T>(msg: String) -> Result<T> {
    Err(Error::InvalidScene(msg))
}

impl SceneDescription {
    pub fn from_str(s: &str) -> Result<SceneDescription> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<SceneDescription> {
        let s = fs::read_to_string(path)?;
        SceneDescription::from_str(&s)
    }

    fn camera(&self) -> Result<Camera> {
        let [width, height] = self.size;
        let c = &self.camera;

        if width == 0 || height == 0 {
            return invalid(format!("image size must be positive, got {}x{}",
                width, height));
        }

        if !(c.fovy > 0.0 && c.fovy < 180.0) {
            return invalid(format!("fovy must be within (0, 180), got {}", c.fovy));
        }

        let view = c.look_at - c.eye;
        if view.length() == 0.0 {
            return invalid("camera eye and look_at coincide".to_string());
        }

        if c.up.cross(&view).length() == 0.0 {
            return invalid("camera up is parallel to the view direction".to_string());
        }

        Ok(Camera::new(c.eye, c.look_at, c.up, c.fovy, width, height))
    }

    fn light(desc: &LightDescription) -> Result<Light> {
        match *desc {
            LightDescription::Directional { direction, color } => {
                if direction.length() == 0.0 {
                    return invalid("directional light has a zero direction".to_string());
                }

                Ok(Light::directional(direction, color))
            },
            LightDescription::Point { position, color }
                => Ok(Light::point(position, color)),
        }
    }

    /// Builds the scene, executing every command in order.
    ///
    /// Popping an empty transform stack is logged and otherwise ignored;
    /// every other problem fails the whole build.
    pub fn build(&self) -> Result<Scene> {
        let mut scene = Scene::new(self.camera()?);
        scene.set_max_depth(self.maxdepth)?;
        scene.ambient = self.ambient;
        scene.attenuation = self.attenuation;

        for light in self.lights.iter() {
            scene.add_light(SceneDescription::light(light)?);
        }

        let mut material = Material { ambient: self.ambient, ..Default::default() };
        let mut transform = AffineTransform::new();

        for (i, command) in self.commands.iter().enumerate() {
            match *command {
                Command::Translate([x, y, z]) => transform.translate(x, y, z),
                Command::Rotate { axis, degrees } => {
                    if axis.length() == 0.0 {
                        return invalid(format!("command {}: zero rotation axis", i));
                    }

                    transform.rotate(axis, degrees);
                },
                Command::Scale([x, y, z]) => transform.scale(x, y, z),
                Command::PushTransform => transform.push_transform()?,
                Command::PopTransform => match transform.pop_transform() {
                    Err(TransformError::EmptyStack)
                        => error!("command {}: {}", i, TransformError::EmptyStack),
                    other => other?,
                },

                Command::Ambient(c) => material.ambient = c,
                Command::Diffuse(c) => material.diffuse = c,
                Command::Specular(c) => material.specular = c,
                Command::Shininess(s) => material.shininess = s,
                Command::Emission(c) => material.emission = c,

                Command::Sphere { center, radius } => {
                    if !(radius > 0.0) {
                        return invalid(format!(
                            "command {}: sphere radius must be positive, got {}",
                            i, radius));
                    }

                    scene.add_object(Shape::sphere(center, radius, material)
                        .transformed(transform.composed()));
                },
                Command::Tri(indices) => {
                    let mut p = [Vector3::zero(); 3];
                    for (v, &index) in p.iter_mut().zip(indices.iter()) {
                        *v = match self.vertices.get(index) {
                            Some(&vertex) => vertex,
                            None => return invalid(format!(
                                "command {}: vertex {} out of range ({} vertices)",
                                i, index, self.vertices.len())),
                        };
                    }

                    scene.add_object(Shape::triangle(p[0], p[1], p[2], material)
                        .transformed(transform.composed()));
                },
            }
        }

        debug!("loaded {} objects and {} lights",
            scene.objects().len(), scene.lights.len());

        Ok(scene)
    }
}

impl TryFrom<SceneDescription> for Scene {
    type Error = Error;

    fn try_from(desc: SceneDescription) -> Result<Scene> {
        desc.build()
    }
}

/// Loads a scene file, returning the scene and its preferred output path.
pub fn load<P: AsRef<Path>>(path: P) -> Result<(Scene, Option<String>)> {
    let desc = SceneDescription::from_file(path)?;
    let scene = desc.build()?;

    Ok((scene, desc.output))
}

#[cfg(test)]
fn with_commands(extra: &str) -> String {
    format!(r#"{{
        "size": [40, 30],
        "camera": {{
            "eye": [0, 0, 5], "look_at": [0, 0, 0], "up": [0, 1, 0],
            "fovy": 60
        }},
        "vertices": [[-1, -1, 0], [1, -1, 0], [0, 1, 0]],
        "commands": [{}]
    }}"#, extra)
}

#[cfg(test)]
fn build(json: &str) -> Result<Scene> {
    SceneDescription::from_str(json)?.build()
}

#[test]
fn defaults_for_optional_fields() {
    let desc = SceneDescription::from_str(&with_commands("")).unwrap();

    assert_eq!(desc.maxdepth, DEFAULT_MAX_DEPTH);
    assert_eq!(desc.output, None);
    assert_eq!(desc.attenuation, Attenuation::default());
    assert_eq!(desc.ambient, Color::rgb(0.2, 0.2, 0.2));

    let scene = desc.build().unwrap();
    assert_eq!(scene.width(), 40);
    assert_eq!(scene.height(), 30);
    assert!(scene.objects().is_empty());
}

#[test]
fn shapes_snapshot_material_state() {
    let scene = build(&with_commands(r#"
        { "diffuse": [1, 0, 0] },
        { "sphere": { "center": [0, 0, 0], "radius": 1 } },
        { "diffuse": [0, 1, 0] },
        { "shininess": 10 },
        { "tri": [0, 1, 2] }
    "#)).unwrap();

    let objects = scene.objects();
    assert_eq!(objects.len(), 2);
    assert_eq!(objects[0].material.diffuse, Color::rgb(1.0, 0.0, 0.0));
    assert_eq!(objects[0].material.shininess, 0.0);
    assert_eq!(objects[1].material.diffuse, Color::rgb(0.0, 1.0, 0.0));
    assert_eq!(objects[1].material.shininess, 10.0);

    // Global ambient is the default material ambient.
    assert_eq!(objects[0].material.ambient, Color::rgb(0.2, 0.2, 0.2));
}

#[test]
fn shapes_snapshot_composed_transform() {
    use crate::matrix::Matrix4D;

    let scene = build(&with_commands(r#"
        { "translate": [0, 0, -5] },
        "push_transform",
        { "scale": [2, 2, 2] },
        { "sphere": { "center": [0, 0, 0], "radius": 1 } },
        "pop_transform",
        { "sphere": { "center": [0, 0, 0], "radius": 1 } }
    "#)).unwrap();

    let objects = scene.objects();
    assert_eq!(*objects[0].transform(),
        Matrix4D::translation(0.0, 0.0, -5.0) * Matrix4D::scaling(2.0, 2.0, 2.0));
    assert_eq!(*objects[1].transform(), Matrix4D::translation(0.0, 0.0, -5.0));
}

#[test]
fn lights_and_globals() {
    let scene = build(r#"{
        "size": [10, 10],
        "maxdepth": 2,
        "output": "scene.ppm",
        "camera": {
            "eye": [0, 0, 5], "look_at": [0, 0, 0], "up": [0, 1, 0], "fovy": 45
        },
        "attenuation": [0, 1, 0],
        "ambient": [0.1, 0.1, 0.1],
        "lights": [
            { "type": "directional", "direction": [0, 0, 2], "color": [1, 1, 1] },
            { "type": "point", "position": [1, 2, 3], "color": [0.5, 0.5, 0.5] }
        ]
    }"#).unwrap();

    assert_eq!(scene.max_depth, 2);
    assert_eq!(scene.ambient, Color::rgb(0.1, 0.1, 0.1));
    assert_eq!(scene.attenuation.linear, 1.0);
    assert_eq!(scene.lights, vec![
        Light::directional(Vector3::new(0.0, 0.0, 1.0), Color::white()),
        Light::point(Vector3::new(1.0, 2.0, 3.0), Color::rgb(0.5, 0.5, 0.5)),
    ]);
}

#[test]
fn pop_on_empty_stack_is_not_fatal() {
    let scene = build(&with_commands(r#"
        { "translate": [1, 0, 0] },
        "pop_transform",
        { "sphere": { "center": [0, 0, 0], "radius": 1 } }
    "#)).unwrap();

    use crate::matrix::Matrix4D;
    assert_eq!(*scene.objects()[0].transform(), Matrix4D::translation(1.0, 0.0, 0.0));
}

#[test]
fn transform_stack_overflow_is_fatal() {
    let pushes = vec!["\"push_transform\""; crate::consts::MAX_TRANSFORM_DEPTH + 1];
    let err = build(&with_commands(&pushes.join(","))).unwrap_err();

    assert!(matches!(err, Error::Transform(TransformError::StackOverflow(_))));
}

#[test]
fn max_depth_above_recursion_limit_is_rejected() {
    use crate::consts::MAX_RECURSION_DEPTH;

    let with_depth = |depth: usize| with_commands("")
        .replacen("\"size\"", &format!("\"maxdepth\": {}, \"size\"", depth), 1);

    let scene = build(&with_depth(MAX_RECURSION_DEPTH)).unwrap();
    assert_eq!(scene.max_depth, MAX_RECURSION_DEPTH);

    for depth in [MAX_RECURSION_DEPTH + 1, 20000] {
        assert!(matches!(build(&with_depth(depth)), Err(Error::InvalidScene(_))));
    }
}

#[test]
fn vertex_index_out_of_range() {
    let err = build(&with_commands(r#"{ "tri": [0, 1, 3] }"#)).unwrap_err();

    assert!(matches!(err, Error::InvalidScene(_)));
}

#[test]
fn invalid_geometry_and_camera() {
    assert!(matches!(
        build(&with_commands(r#"{ "sphere": { "center": [0, 0, 0], "radius": 0 } }"#)),
        Err(Error::InvalidScene(_))
    ));

    assert!(matches!(
        build(&with_commands(r#"{ "rotate": { "axis": [0, 0, 0], "degrees": 10 } }"#)),
        Err(Error::InvalidScene(_))
    ));

    let parallel_up = with_commands("").replace("\"up\": [0, 1, 0]", "\"up\": [0, 0, 1]");
    assert!(matches!(build(&parallel_up), Err(Error::InvalidScene(_))));

    let no_pixels = with_commands("").replace("[40, 30]", "[0, 30]");
    assert!(matches!(build(&no_pixels), Err(Error::InvalidScene(_))));
}

#[test]
fn malformed_json_is_reported() {
    assert!(matches!(build("{ \"size\": [1, 1] "), Err(Error::Json(_))));
    assert!(matches!(
        build(&with_commands(r#"{ "explode": [] }"#)),
        Err(Error::Json(_))
    ));
}

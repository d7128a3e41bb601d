use crate::consts::{ RAY_EPSILON, MAX_RECURSION_DEPTH };
use crate::ray::Ray;
use crate::color::Color;
use crate::light::lighting;
use crate::scene::Scene;
use crate::intersect::Intersection;

/// Traces a ray through the scene, returning its color.
///
/// `depth` is the number of reflections already followed; primary rays start
/// at zero.
pub fn trace(scene: &Scene, ray: &Ray, depth: usize) -> Color {
    let hit = scene.intersect(ray);
    find_color(ray, &hit, scene, depth)
}

/// Evaluates the Whitted illumination model for one intersection.
///
/// The color is the material's ambient and emission terms, the Phong
/// contribution of every light that is not shadowed and, while `depth` is
/// below the scene's maximum (capped at `MAX_RECURSION_DEPTH`), the mirror
/// reflection weighted by the material's specular coefficient. Point lights
/// lying exactly on the shaded point are skipped. Every channel is clamped
/// to `[0, 1]`.
///
/// A miss is black.
pub fn find_color(ray: &Ray, hit: &Intersection, scene: &Scene,
    depth: usize) -> Color {
    if !hit.is_hit() {
        return Color::black();
    }

    let m = &hit.material;
    let to_eye = -ray.direction;

    // Shade the side facing the viewer.
    let normal = if hit.normal.dot(&to_eye) < 0.0 {
        -hit.normal
    } else {
        hit.normal
    };

    let mut color = m.ambient + m.emission;

    for light in scene.lights.iter() {
        let (to_light, distance) = light.to_light(hit.point);
        if distance == 0.0 {
            continue;
        }

        let shadow_ray = Ray::offset(hit.point, to_light, RAY_EPSILON);

        if scene.is_shadowed(&shadow_ray, light) {
            continue;
        }

        let attenuation = scene.attenuation(hit.point, light);
        color += lighting(m, normal, to_light, to_eye, light.color(), attenuation);
    }

    let max_depth = scene.max_depth.min(MAX_RECURSION_DEPTH);
    if depth < max_depth && m.is_reflective() {
        let direction = ray.direction.reflect(&normal).normalize();
        let reflected = Ray::offset(hit.point, direction, RAY_EPSILON);

        color += m.specular * trace(scene, &reflected, depth + 1);
    }

    color.clamp()
}

#[cfg(test)]
use crate::vector::Vector3;

#[cfg(test)]
use crate::light::{ Light, Material };

#[cfg(test)]
use crate::shape::Shape;

#[cfg(test)]
fn empty_scene() -> Scene {
    use crate::camera::Camera;

    Scene::new(Camera::new(
        Vector3::zero(),
        Vector3::new(0.0, 0.0, -1.0),
        Vector3::new(0.0, 1.0, 0.0),
        90.0,
        10, 10
    ))
}

/// A perfect mirror in front of the origin, and a glowing sphere behind it.
#[cfg(test)]
fn mirror_scene(max_depth: usize) -> Scene {
    let mut s = empty_scene();
    s.max_depth = max_depth;

    let mut mirror = Material::default();
    mirror.ambient = Color::black();
    mirror.specular = Color::white();
    mirror.shininess = 1.0;
    s.add_object(Shape::sphere(Vector3::new(0.0, 0.0, -3.0), 1.0, mirror));

    let mut glow = Material::default();
    glow.ambient = Color::black();
    glow.emission = Color::rgb(0.5, 0.5, 0.5);
    s.add_object(Shape::sphere(Vector3::new(0.0, 0.0, 3.0), 1.0, glow));

    s
}

#[test]
fn miss_is_black() {
    let s = empty_scene();
    let r = Ray::new(Vector3::zero(), Vector3::new(0.0, 0.0, -1.0));

    assert_eq!(trace(&s, &r, 0), Color::black());
}

#[test]
fn ambient_and_emission_without_lights() {
    let mut s = empty_scene();
    let mut m = Material::default();
    m.ambient = Color::rgb(0.1, 0.2, 0.3);
    m.emission = Color::rgb(0.1, 0.1, 0.1);
    s.add_object(Shape::sphere(Vector3::new(0.0, 0.0, -3.0), 1.0, m));

    let r = Ray::new(Vector3::zero(), Vector3::new(0.0, 0.0, -1.0));

    assert_eq!(trace(&s, &r, 0), Color::rgb(0.2, 0.3, 0.4));
}

#[test]
fn zero_max_depth_never_reflects() {
    let s = mirror_scene(0);
    let r = Ray::new(Vector3::zero(), Vector3::new(0.0, 0.0, -1.0));

    assert_eq!(trace(&s, &r, 0), Color::black());
}

#[test]
fn mirror_reflects_scene_behind_viewer() {
    let s = mirror_scene(1);
    let r = Ray::new(Vector3::zero(), Vector3::new(0.0, 0.0, -1.0));

    assert_eq!(trace(&s, &r, 0), Color::rgb(0.5, 0.5, 0.5));

    // Already at the limit.
    assert_eq!(trace(&s, &r, 1), Color::black());
}

#[test]
fn back_facing_triangle_is_lit_from_the_front() {
    let mut s = empty_scene();
    s.add_light(Light::point(Vector3::zero(), Color::white()));

    let mut m = Material::default();
    m.ambient = Color::black();
    m.diffuse = Color::rgb(0.5, 0.5, 0.5);
    s.add_object(Shape::triangle(
        Vector3::new(-1.0, -1.0, -2.0),
        Vector3::new(1.0, -1.0, -2.0),
        Vector3::new(0.0, 1.0, -2.0),
        m
    ));

    let r = Ray::towards(Vector3::zero(), Vector3::new(0.0, 0.0, -2.0));

    assert_eq!(trace(&s, &r, 0), Color::rgb(0.5, 0.5, 0.5));
}

#[test]
fn shadowed_point_keeps_only_ambient() {
    let mut s = empty_scene();
    s.add_light(Light::point(Vector3::new(0.0, 0.0, 10.0), Color::white()));

    let mut m = Material::default();
    m.diffuse = Color::white();
    s.add_object(Shape::sphere(Vector3::new(0.0, 0.0, -3.0), 1.0, m));

    // Occluder between the hit point and the light, out of the eye's way.
    let mut lit = trace(&s, &Ray::new(Vector3::zero(), Vector3::new(0.0, 0.0, -1.0)), 0);
    assert_eq!(lit, Color::white());

    s.add_object(Shape::sphere(Vector3::new(0.0, 0.0, 5.0), 0.5, Default::default()));
    lit = trace(&s, &Ray::new(Vector3::zero(), Vector3::new(0.0, 0.0, -1.0)), 0);
    assert_eq!(lit, Color::rgb(0.2, 0.2, 0.2));
}

#[test]
fn point_light_is_attenuated() {
    use crate::light::Attenuation;

    let mut s = empty_scene();
    s.attenuation = Attenuation { constant: 0.0, linear: 0.5, quadratic: 0.0 };
    s.add_light(Light::point(Vector3::zero(), Color::white()));

    let mut m = Material::default();
    m.ambient = Color::black();
    m.diffuse = Color::white();
    s.add_object(Shape::sphere(Vector3::new(0.0, 0.0, -5.0), 1.0, m));

    // Hit at distance 4 from the light: 1 / (0.5 * 4).
    let r = Ray::new(Vector3::zero(), Vector3::new(0.0, 0.0, -1.0));
    assert_eq!(trace(&s, &r, 0), Color::rgb(0.5, 0.5, 0.5));
}

#[test]
fn light_on_the_surface_is_skipped() {
    use crate::intersect::ObjectId;

    let mut s = empty_scene();
    let point = Vector3::new(0.0, 0.0, -2.0);
    s.add_light(Light::point(point, Color::white()));

    let mut m = Material::default();
    m.diffuse = Color::white();

    let r = Ray::new(Vector3::zero(), Vector3::new(0.0, 0.0, -1.0));
    let hit = Intersection::new(2.0, point, Vector3::new(0.0, 0.0, 1.0),
        ObjectId(0), m);

    assert_eq!(find_color(&r, &hit, &s, 0), Color::rgb(0.2, 0.2, 0.2));
}

#[test]
fn reflection_depth_is_capped() {
    // A mirrored sphere around the eye and the light bounces forever.
    let enclosure = |max_depth| {
        let mut s = empty_scene();
        s.max_depth = max_depth;
        s.add_light(Light::point(Vector3::zero(), Color::white()));

        let mut m = Material::default();
        m.diffuse = Color::rgb(0.1, 0.1, 0.1);
        m.specular = Color::rgb(0.5, 0.5, 0.5);
        s.add_object(Shape::sphere(Vector3::zero(), 5.0, m));
        s
    };

    let r = Ray::new(Vector3::zero(), Vector3::new(0.3, -0.2, -1.0).normalize());
    let capped = trace(&enclosure(MAX_RECURSION_DEPTH), &r, 0);
    let unbounded = trace(&enclosure(usize::MAX), &r, 0);

    assert_eq!(capped.r.to_bits(), unbounded.r.to_bits());
    assert_eq!(capped.g.to_bits(), unbounded.g.to_bits());
    assert_eq!(capped.b.to_bits(), unbounded.b.to_bits());
    assert!(capped.r > 0.0 && capped.r <= 1.0);
}

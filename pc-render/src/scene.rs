use std::fmt;

use pc_format::{PointTrait, Rgb};

use crate::{Point3, RenderConfig};

const FOOTER: &str = r#"
    <shape type="rectangle">
        <ref name="bsdf" id="surfaceMaterial"/>
        <transform name="toWorld">
            <scale x="10" y="10" z="2"/>
            <translate x="0" y="0" z="-0.5"/>
        </transform>
    </shape>

    <shape type="rectangle">
        <transform name="toWorld">
            <scale x="10" y="10" z="1"/>
            <lookat origin="-4,4,20" target="0,0,0" up="0,0,1"/>
        </transform>
        <emitter type="area">
            <rgb name="radiance" value="6,6,6"/>
        </emitter>
    </shape>
</scene>
"#;

/// Mitsuba 0.6 scene description: header, one sphere per point, footer.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneDocument {
    header: String,
    shapes: Vec<String>,
    footer: String,
}

impl SceneDocument {
    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn shapes(&self) -> &[String] {
        &self.shapes
    }

    pub fn footer(&self) -> &str {
        &self.footer
    }

    /// number of shape records
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

impl fmt::Display for SceneDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.header)?;
        for shape in &self.shapes {
            f.write_str(shape)?;
        }
        f.write_str(&self.footer)
    }
}

/// Builds scene documents for one view and sphere radius.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneBuilder {
    resolution: [u32; 2],
    spp: u32,
    view: [f64; 3],
    radius: f64,
    translate: [f64; 3],
    scale: [f64; 3],
}

impl SceneBuilder {
    pub fn new(config: &RenderConfig, radius: f64) -> Self {
        SceneBuilder {
            resolution: config.resolution,
            spp: config.spp,
            view: config.view,
            radius,
            translate: config.translate,
            scale: config.scale,
        }
    }

    /// camera, integrator, sampler, film and the ground material
    pub fn header(&self) -> String {
        let [width, height] = self.resolution;
        let [x, y, z] = self.view;
        format!(
            r#"<scene version="0.6.0">
    <integrator type="path">
        <integer name="maxDepth" value="-1"/>
    </integrator>
    <sensor type="perspective">
        <float name="farClip" value="100"/>
        <float name="nearClip" value="0.1"/>
        <transform name="toWorld">
            <lookat origin="{x},{y},{z}" target="0,0,0" up="0,0,1"/>
        </transform>
        <float name="fov" value="25"/>
        <sampler type="independent">
            <integer name="sampleCount" value="{}"/>
        </sampler>
        <film type="hdrfilm">
            <integer name="width" value="{width}"/>
            <integer name="height" value="{height}"/>
            <rfilter type="gaussian"/>
        </film>
    </sensor>

    <bsdf type="roughplastic" id="surfaceMaterial">
        <string name="distribution" value="ggx"/>
        <float name="alpha" value="0.05"/>
        <float name="intIOR" value="1.46"/>
        <rgb name="diffuseReflectance" value="1,1,1"/>
    </bsdf>
"#,
            self.spp
        )
    }

    /// final position of a sphere: scaled per axis, then translated
    pub fn place(&self, p: &Point3) -> Point3 {
        p.mul(&Point3::new(self.scale))
            .add(&Point3::new(self.translate))
    }

    /// sphere record of one point
    pub fn shape(&self, p: &Point3, rgb: Rgb) -> String {
        let [x, y, z] = self.place(p).into_array();
        let [r, g, b] = rgb;
        format!(
            r#"
    <shape type="sphere">
        <float name="radius" value="{}"/>
        <transform name="toWorld">
            <translate x="{x}" y="{y}" z="{z}"/>
        </transform>
        <bsdf type="diffuse">
            <rgb name="reflectance" value="{r},{g},{b}"/>
        </bsdf>
    </shape>
"#,
            self.radius
        )
    }

    pub fn footer(&self) -> &'static str {
        FOOTER
    }

    /// document of the given (position, color) pairs, in order
    pub fn build<I>(&self, shapes: I) -> SceneDocument
    where
        I: IntoIterator<Item = (Point3, Rgb)>,
    {
        SceneDocument {
            header: self.header(),
            shapes: shapes
                .into_iter()
                .map(|(p, rgb)| self.shape(&p, rgb))
                .collect(),
            footer: self.footer().to_string(),
        }
    }
}

mod geom;

pub(crate) use geom::Geometries;

//! Serde adapters that put points on the wire as `{ "x": .., "y": .. }`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::math::Point2;

#[derive(Serialize, Deserialize)]
struct Xy {
    x: f64,
    y: f64,
}

impl From<&Point2> for Xy {
    fn from(p: &Point2) -> Self {
        Self { x: p.x, y: p.y }
    }
}

impl From<Xy> for Point2 {
    fn from(xy: Xy) -> Self {
        Self::new(xy.x, xy.y)
    }
}

pub mod point {
    use super::{Deserialize, Deserializer, Point2, Serialize, Serializer, Xy};

    pub fn serialize<S: Serializer>(p: &Point2, s: S) -> Result<S::Ok, S::Error> {
        Xy::from(p).serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Point2, D::Error> {
        Ok(Xy::deserialize(d)?.into())
    }
}

pub mod points {
    use super::{Deserialize, Deserializer, Point2, Serializer, Xy};

    #[allow(clippy::ptr_arg)]
    pub fn serialize<S: Serializer>(points: &Vec<Point2>, s: S) -> Result<S::Ok, S::Error> {
        s.collect_seq(points.iter().map(Xy::from))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<Point2>, D::Error> {
        let raw = Vec::<Xy>::deserialize(d)?;
        Ok(raw.into_iter().map(Point2::from).collect())
    }
}

pub mod rings {
    use super::{Deserialize, Deserializer, Point2, Serializer, Xy};

    #[allow(clippy::ptr_arg)]
    pub fn serialize<S: Serializer>(rings: &Vec<Vec<Point2>>, s: S) -> Result<S::Ok, S::Error> {
        s.collect_seq(
            rings
                .iter()
                .map(|ring| ring.iter().map(Xy::from).collect::<Vec<_>>()),
        )
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<Vec<Point2>>, D::Error> {
        let raw = Vec::<Vec<Xy>>::deserialize(d)?;
        Ok(raw
            .into_iter()
            .map(|ring| ring.into_iter().map(Point2::from).collect())
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde::{Deserialize, Serialize};

    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Shape {
        #[serde(with = "point")]
        anchor: Point2,
        #[serde(with = "points")]
        ring: Vec<Point2>,
        #[serde(with = "rings")]
        holes: Vec<Vec<Point2>>,
    }

    #[test]
    fn points_use_object_form() {
        let shape = Shape {
            anchor: Point2::new(1.0, 2.0),
            ring: vec![Point2::new(0.0, 0.0), Point2::new(3.5, -1.0)],
            holes: vec![vec![Point2::new(7.0, 8.0)]],
        };
        let json = serde_json::to_value(&shape).unwrap();
        assert_eq!(json["anchor"], serde_json::json!({ "x": 1.0, "y": 2.0 }));
        assert_eq!(json["ring"][1], serde_json::json!({ "x": 3.5, "y": -1.0 }));
        assert_eq!(json["holes"][0][0]["y"], serde_json::json!(8.0));

        let back: Shape = serde_json::from_value(json).unwrap();
        assert_eq!(back, shape);
    }
}

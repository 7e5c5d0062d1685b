//! Tile geometry decoder.
//!
//! Decodes the compact command-stream encoding used by vector tiles: a
//! sequence of command integers whose low 3 bits select the command
//! (`1 = move_to`, `2 = line_to`, `7 = close_path`) and whose remaining
//! bits give a repeat count. Each move/line repetition consumes one pair of
//! zig-zag-encoded integers, a delta from the running cursor.
//!
//! The output model is a flat command list with *relative* coordinates. A
//! `close_path` in the output does not move the cursor, so the decoder
//! follows every close with a synthesized `move_to` returning the cursor to
//! the sub-path's start; consumers replay deltas without any close-path
//! special-casing. A `reset` command marks the start of an independent
//! sub-path at the tile origin when several features are merged into one
//! command sequence (see the style engine).

mod types;

pub use types::{DecodedGeometry, GeometryError, GeometryKind, PathCommand, Point};

use crate::tile::{GeomType, VectorFeature};

/// Decode zig-zag: `(v >> 1) ^ -(v & 1)`.
#[inline]
fn zigzag(value: u32) -> i32 {
    ((value >> 1) as i32) ^ -((value & 1) as i32)
}

/// Decode one feature's command stream into structured geometry.
///
/// Returns `Ok(None)` for `unknown` and `point` features: point rendering
/// is out of scope and those streams carry nothing the engine draws. A
/// malformed stream is a hard error: it indicates a corrupt tile, not a
/// condition to skip over.
pub fn decode_feature(feature: &VectorFeature) -> Result<Option<DecodedGeometry>, GeometryError> {
    let kind = match feature.geom_type {
        GeomType::Unknown | GeomType::Point => return Ok(None),
        GeomType::LineString => GeometryKind::LineString,
        GeomType::Polygon => GeometryKind::Polygon,
    };

    let stream = &feature.geometry;
    let mut commands = Vec::new();
    // Running absolute cursor and sub-path start, tracked as the delta sums.
    let mut cursor = (0i64, 0i64);
    let mut subpath_start = (0i64, 0i64);
    let mut at = 0usize;

    while at < stream.len() {
        let command = stream[at];
        let count = (command >> 3) as usize;
        match command & 0x7 {
            1 => {
                let pairs = read_pairs(stream, at + 1, count)?;
                for (dx, dy) in pairs {
                    commands.push(PathCommand::MoveTo { x: dx, y: dy });
                    cursor.0 += dx as i64;
                    cursor.1 += dy as i64;
                    subpath_start = cursor;
                }
                at += 1 + count * 2;
            }
            2 => {
                let points = read_pairs(stream, at + 1, count)?
                    .into_iter()
                    .map(|(dx, dy)| {
                        cursor.0 += dx as i64;
                        cursor.1 += dy as i64;
                        Point { x: dx, y: dy }
                    })
                    .collect::<Vec<_>>();
                if !points.is_empty() {
                    commands.push(PathCommand::LineTo { points });
                }
                at += 1 + count * 2;
            }
            7 => {
                commands.push(PathCommand::ClosePath);
                // close_path leaves the output cursor where it was;
                // synthesize the return to the sub-path start.
                commands.push(PathCommand::MoveTo {
                    x: (subpath_start.0 - cursor.0) as i32,
                    y: (subpath_start.1 - cursor.1) as i32,
                });
                cursor = subpath_start;
                at += 1;
            }
            other => return Err(GeometryError::UnknownCommand(other)),
        }
    }

    Ok(Some(DecodedGeometry { kind, commands }))
}

/// Read `count` zig-zag coordinate pairs starting at `from`.
fn read_pairs(stream: &[u32], from: usize, count: usize) -> Result<Vec<(i32, i32)>, GeometryError> {
    let end = from + count * 2;
    if end > stream.len() {
        return Err(GeometryError::TruncatedStream {
            offset: stream.len(),
        });
    }
    Ok(stream[from..end]
        .chunks_exact(2)
        .map(|pair| (zigzag(pair[0]), zigzag(pair[1])))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn feature(geom_type: GeomType, geometry: Vec<u32>) -> VectorFeature {
        VectorFeature {
            id: None,
            tags: vec![],
            geom_type,
            geometry,
        }
    }

    #[test]
    fn test_zigzag_decoding() {
        assert_eq!(zigzag(0), 0);
        assert_eq!(zigzag(1), -1);
        assert_eq!(zigzag(2), 1);
        assert_eq!(zigzag(944), 472);
        assert_eq!(zigzag(1996), 998);
        assert_eq!(zigzag(3), -2);
        assert_eq!(zigzag(67), -34);
    }

    #[test]
    fn test_decode_linestring() {
        let decoded = decode_feature(&feature(GeomType::LineString, vec![9, 944, 1996, 10, 3, 67]))
            .unwrap()
            .unwrap();
        assert_eq!(decoded.kind, GeometryKind::LineString);
        assert_eq!(
            decoded.commands,
            vec![
                PathCommand::MoveTo { x: 472, y: 998 },
                PathCommand::LineTo {
                    points: vec![Point { x: -2, y: -34 }],
                },
            ]
        );
    }

    #[test]
    fn test_decode_polygon_synthesizes_return_move() {
        // move_to(1,1); line_to(2,0)(0,2); close
        let stream = vec![9, 2, 2, 18, 4, 0, 0, 4, 15];
        let decoded = decode_feature(&feature(GeomType::Polygon, stream))
            .unwrap()
            .unwrap();
        assert_eq!(decoded.kind, GeometryKind::Polygon);
        assert_eq!(
            decoded.commands,
            vec![
                PathCommand::MoveTo { x: 1, y: 1 },
                PathCommand::LineTo {
                    points: vec![Point { x: 2, y: 0 }, Point { x: 0, y: 2 }],
                },
                PathCommand::ClosePath,
                // Back from (3, 3) to the sub-path start (1, 1).
                PathCommand::MoveTo { x: -2, y: -2 },
            ]
        );
    }

    #[test]
    fn test_decode_multi_ring_polygon_tracks_each_start() {
        // Two rings; the second starts relative to where the first closed.
        let stream = vec![
            9, 2, 2, // move_to(1,1)
            18, 4, 0, 0, 4, // line_to(2,0)(0,2)
            15, // close -> back to (1,1)
            9, 8, 0, // move_to(4,0) -> (5,1)
            18, 2, 0, 0, 2, // line_to(1,0)(0,1)
            15, // close -> back to (5,1)
        ];
        let decoded = decode_feature(&feature(GeomType::Polygon, stream))
            .unwrap()
            .unwrap();
        assert_eq!(
            decoded.commands[5],
            PathCommand::MoveTo { x: 4, y: 0 },
            "second ring starts from the first ring's start"
        );
        assert_eq!(
            decoded.commands[8],
            PathCommand::MoveTo { x: -1, y: -1 },
            "second close returns to the second ring's start"
        );
    }

    #[test]
    fn test_decode_repeated_move_to() {
        // One command integer, two move_to repetitions.
        let stream = vec![17, 2, 2, 4, 4];
        let decoded = decode_feature(&feature(GeomType::LineString, stream))
            .unwrap()
            .unwrap();
        assert_eq!(
            decoded.commands,
            vec![
                PathCommand::MoveTo { x: 1, y: 1 },
                PathCommand::MoveTo { x: 2, y: 2 },
            ]
        );
    }

    #[test]
    fn test_unknown_and_point_features_yield_no_geometry() {
        assert_eq!(
            decode_feature(&feature(GeomType::Unknown, vec![9, 2, 2])).unwrap(),
            None
        );
        assert_eq!(
            decode_feature(&feature(GeomType::Point, vec![9, 2, 2])).unwrap(),
            None
        );
    }

    #[test]
    fn test_empty_stream_decodes_to_empty_commands() {
        let decoded = decode_feature(&feature(GeomType::Polygon, vec![]))
            .unwrap()
            .unwrap();
        assert!(decoded.commands.is_empty());
    }

    #[test]
    fn test_unrecognized_command_is_an_error() {
        let err = decode_feature(&feature(GeomType::LineString, vec![3])).unwrap_err();
        assert_eq!(err, GeometryError::UnknownCommand(3));

        let err = decode_feature(&feature(GeomType::LineString, vec![8])).unwrap_err();
        assert_eq!(err, GeometryError::UnknownCommand(0));
    }

    #[test]
    fn test_missing_coordinate_pair_is_an_error() {
        let err = decode_feature(&feature(GeomType::LineString, vec![9, 50])).unwrap_err();
        assert!(matches!(err, GeometryError::TruncatedStream { .. }));

        // Repeat count overruns the stream.
        let err = decode_feature(&feature(GeomType::LineString, vec![18, 0, 0])).unwrap_err();
        assert!(matches!(err, GeometryError::TruncatedStream { .. }));
    }

    proptest! {
        /// Decoding never panics, whatever the stream contains.
        #[test]
        fn prop_decode_total(stream in prop::collection::vec(any::<u32>(), 0..64)) {
            let _ = decode_feature(&feature(GeomType::Polygon, stream));
        }

        /// Well-formed single-ring streams always decode.
        #[test]
        fn prop_single_ring_decodes(
            pairs in prop::collection::vec((0u32..1u32 << 16, 0u32..1u32 << 16), 1..12)
        ) {
            let mut stream = vec![9, pairs[0].0, pairs[0].1];
            if pairs.len() > 1 {
                stream.push((((pairs.len() - 1) as u32) << 3) | 2);
                for (x, y) in &pairs[1..] {
                    stream.push(*x);
                    stream.push(*y);
                }
            }
            stream.push(15);
            let decoded = decode_feature(&feature(GeomType::Polygon, stream)).unwrap().unwrap();
            prop_assert!(
                matches!(decoded.commands.last(), Some(PathCommand::MoveTo { .. })),
                "last command should be MoveTo"
            );
        }
    }
}

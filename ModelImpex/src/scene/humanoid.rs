//! Humanoid bone roles (VRM humanoid) and their extension formats.

use serde_json::Value;

use crate::error::{Error, Result};

macro_rules! humanoid_bones {
    ($($variant:ident => $name:literal),* $(,)?) => {
        /// Role of a node in a humanoid rig.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum HumanoidBone {
            $($variant,)*
        }

        impl HumanoidBone {
            /// Every known role, in declaration order.
            pub const ALL: &'static [HumanoidBone] = &[$(HumanoidBone::$variant,)*];

            /// The VRM bone name, e.g. `leftUpperArm`.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(HumanoidBone::$variant => $name,)*
                }
            }

            /// Look up a role by its VRM bone name.
            #[must_use]
            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($name => Some(HumanoidBone::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

humanoid_bones! {
    Hips => "hips",

    // Legs
    LeftUpperLeg => "leftUpperLeg",
    RightUpperLeg => "rightUpperLeg",
    LeftLowerLeg => "leftLowerLeg",
    RightLowerLeg => "rightLowerLeg",
    LeftFoot => "leftFoot",
    RightFoot => "rightFoot",
    LeftToes => "leftToes",
    RightToes => "rightToes",

    // Spine
    Spine => "spine",
    Chest => "chest",
    UpperChest => "upperChest",
    Neck => "neck",
    Head => "head",
    LeftEye => "leftEye",
    RightEye => "rightEye",
    Jaw => "jaw",

    // Arms
    LeftShoulder => "leftShoulder",
    RightShoulder => "rightShoulder",
    LeftUpperArm => "leftUpperArm",
    RightUpperArm => "rightUpperArm",
    LeftLowerArm => "leftLowerArm",
    RightLowerArm => "rightLowerArm",
    LeftHand => "leftHand",
    RightHand => "rightHand",

    // Fingers
    LeftThumbMetacarpal => "leftThumbMetacarpal",
    LeftThumbProximal => "leftThumbProximal",
    LeftThumbIntermediate => "leftThumbIntermediate",
    LeftThumbDistal => "leftThumbDistal",
    LeftIndexProximal => "leftIndexProximal",
    LeftIndexIntermediate => "leftIndexIntermediate",
    LeftIndexDistal => "leftIndexDistal",
    LeftMiddleProximal => "leftMiddleProximal",
    LeftMiddleIntermediate => "leftMiddleIntermediate",
    LeftMiddleDistal => "leftMiddleDistal",
    LeftRingProximal => "leftRingProximal",
    LeftRingIntermediate => "leftRingIntermediate",
    LeftRingDistal => "leftRingDistal",
    LeftLittleProximal => "leftLittleProximal",
    LeftLittleIntermediate => "leftLittleIntermediate",
    LeftLittleDistal => "leftLittleDistal",
    RightThumbMetacarpal => "rightThumbMetacarpal",
    RightThumbProximal => "rightThumbProximal",
    RightThumbIntermediate => "rightThumbIntermediate",
    RightThumbDistal => "rightThumbDistal",
    RightIndexProximal => "rightIndexProximal",
    RightIndexIntermediate => "rightIndexIntermediate",
    RightIndexDistal => "rightIndexDistal",
    RightMiddleProximal => "rightMiddleProximal",
    RightMiddleIntermediate => "rightMiddleIntermediate",
    RightMiddleDistal => "rightMiddleDistal",
    RightRingProximal => "rightRingProximal",
    RightRingIntermediate => "rightRingIntermediate",
    RightRingDistal => "rightRingDistal",
    RightLittleProximal => "rightLittleProximal",
    RightLittleIntermediate => "rightLittleIntermediate",
    RightLittleDistal => "rightLittleDistal",
}

impl std::fmt::Display for HumanoidBone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extension name of VRM 0.x.
pub const VRM0_EXTENSION: &str = "VRM";
/// Extension name of VRM 1.0.
pub const VRM1_EXTENSION: &str = "VRMC_vrm";

/// Read `(node index, role)` pairs from the root-level extensions.
///
/// VRM 0.x stores `humanoid.humanBones` as a list of `{bone, node}`; VRM 1.0
/// stores it as a map from bone name to `{node}`. VRM 1.0 wins when both
/// are present.
///
/// # Errors
/// Returns [`Error::UnknownHumanoidBone`] for an unrecognized bone name.
pub fn read_humanoid_bones(
    extensions: Option<&serde_json::Map<String, Value>>,
) -> Result<Vec<(usize, HumanoidBone)>> {
    let Some(extensions) = extensions else {
        return Ok(Vec::new());
    };

    let mut bones = Vec::new();
    if let Some(human_bones) = extensions
        .get(VRM1_EXTENSION)
        .and_then(|vrm| vrm.pointer("/humanoid/humanBones"))
        .and_then(Value::as_object)
    {
        for (name, bone) in human_bones {
            if let Some(node) = bone.get("node").and_then(Value::as_u64) {
                bones.push((node as usize, parse_bone(name)?));
            }
        }
    } else if let Some(human_bones) = extensions
        .get(VRM0_EXTENSION)
        .and_then(|vrm| vrm.pointer("/humanoid/humanBones"))
        .and_then(Value::as_array)
    {
        for bone in human_bones {
            let name = bone.get("bone").and_then(Value::as_str);
            let node = bone.get("node").and_then(Value::as_u64);
            if let (Some(name), Some(node)) = (name, node) {
                bones.push((node as usize, parse_bone(name)?));
            }
        }
    }
    Ok(bones)
}

/// Root-level extensions carrying `(node index, role)` pairs as a VRM 0.x
/// `humanoid.humanBones` list, or `None` when there are no roles.
#[must_use]
pub fn write_humanoid_bones(bones: &[(usize, HumanoidBone)]) -> Option<serde_json::Map<String, Value>> {
    if bones.is_empty() {
        return None;
    }
    let human_bones: Vec<Value> = bones
        .iter()
        .map(|&(node, bone)| serde_json::json!({ "bone": bone.as_str(), "node": node }))
        .collect();

    let mut extensions = serde_json::Map::new();
    extensions.insert(
        VRM0_EXTENSION.to_string(),
        serde_json::json!({
            "specVersion": "0.0",
            "humanoid": { "humanBones": human_bones },
        }),
    );
    Some(extensions)
}

fn parse_bone(name: &str) -> Result<HumanoidBone> {
    HumanoidBone::from_name(name).ok_or_else(|| Error::UnknownHumanoidBone {
        name: name.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn extensions(json: &str) -> serde_json::Map<String, Value> {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_names_round_trip() {
        for &bone in HumanoidBone::ALL {
            assert_eq!(HumanoidBone::from_name(bone.as_str()), Some(bone));
        }
        assert_eq!(HumanoidBone::from_name("tail"), None);
    }

    #[test]
    fn test_vrm0_list() {
        let ext = extensions(
            r#"{"VRM":{"humanoid":{"humanBones":[{"bone":"hips","node":2},{"bone":"head","node":5}]}}}"#,
        );
        assert_eq!(
            read_humanoid_bones(Some(&ext)).unwrap(),
            vec![(2, HumanoidBone::Hips), (5, HumanoidBone::Head)]
        );
    }

    #[test]
    fn test_vrm1_map() {
        let ext = extensions(
            r#"{"VRMC_vrm":{"humanoid":{"humanBones":{"hips":{"node":0},"leftThumbMetacarpal":{"node":9}}}}}"#,
        );
        assert_eq!(
            read_humanoid_bones(Some(&ext)).unwrap(),
            vec![(0, HumanoidBone::Hips), (9, HumanoidBone::LeftThumbMetacarpal)]
        );
    }

    #[test]
    fn test_unknown_bone() {
        let ext = extensions(r#"{"VRM":{"humanoid":{"humanBones":[{"bone":"tail","node":1}]}}}"#);
        assert!(matches!(
            read_humanoid_bones(Some(&ext)),
            Err(Error::UnknownHumanoidBone { name }) if name == "tail"
        ));
        assert!(read_humanoid_bones(None).unwrap().is_empty());
    }

    #[test]
    fn test_written_list_reads_back() {
        let bones = vec![(0, HumanoidBone::Hips), (3, HumanoidBone::LeftHand)];
        let ext = write_humanoid_bones(&bones).unwrap();
        assert_eq!(ext["VRM"]["humanoid"]["humanBones"][1]["bone"], "leftHand");
        assert_eq!(read_humanoid_bones(Some(&ext)).unwrap(), bones);
        assert_eq!(write_humanoid_bones(&[]), None);
    }
}

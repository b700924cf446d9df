//! Files bundled into the binary. Internal loaders read from here so the defaults cannot fail.

const BUNDLED: &[(&str, &[u8])] = &[
    (
        "bedrock/skin/skin_steve.png",
        include_bytes!("../assets/bedrock/skin/skin_steve.png"),
    ),
    (
        "bedrock/skin/skin_alex.png",
        include_bytes!("../assets/bedrock/skin/skin_alex.png"),
    ),
    (
        "bedrock/skin/geometry.humanoid.ears.json",
        include_bytes!("../assets/bedrock/skin/geometry.humanoid.ears.json"),
    ),
    (
        "bedrock/skin/geometry.humanoid.earsSlim.json",
        include_bytes!("../assets/bedrock/skin/geometry.humanoid.earsSlim.json"),
    ),
    (
        "bedrock/skin/geometry.humanoid.customskull.json",
        include_bytes!("../assets/bedrock/skin/geometry.humanoid.customskull.json"),
    ),
];

pub fn bundled(path: &str) -> anyhow::Result<&'static [u8]> {
    BUNDLED
        .iter()
        .find(|(name, _)| *name == path)
        .map(|(_, data)| *data)
        .ok_or_else(|| anyhow::anyhow!("No bundled resource at {path}"))
}

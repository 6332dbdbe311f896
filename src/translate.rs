use scrape::{Labels, TargetGroup, TargetSets};

use crate::discovery::Target;

/// Converts discovered targets into the target sets consumed by the engine.
///
/// All targets end up in one group whose source is `id`, registered under
/// the target set `id`. The group is present even when `targets` is empty,
/// so the engine drops whatever it scraped for this set before.
pub fn translate(id: &str, targets: &[Target]) -> TargetSets {
    let group = TargetGroup {
        source: id.to_string(),
        targets: targets.iter().map(convert_labels).collect(),
        labels: Labels::new(),
    };

    TargetSets::from([(id.to_string(), vec![group])])
}

fn convert_labels(target: &Target) -> Labels {
    target.iter().collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn empty() {
        let sets = translate("prometheus.scrape.default", &[]);

        assert_eq!(sets.len(), 1);
        let groups = &sets["prometheus.scrape.default"];
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].source, "prometheus.scrape.default");
        assert!(groups[0].targets.is_empty());
    }

    #[test]
    fn keeps_order_and_labels() {
        let targets = vec![
            Target::from_iter([("__address__", "10.0.0.2:9100"), ("env", "dev")]),
            Target::from_iter([("__address__", "10.0.0.1:9100")]),
        ];

        let sets = translate("node", &targets);
        assert_eq!(
            sets["node"],
            vec![TargetGroup {
                source: "node".to_string(),
                targets: vec![
                    Labels::from_iter([("__address__", "10.0.0.2:9100"), ("env", "dev")]),
                    Labels::from_iter([("__address__", "10.0.0.1:9100")]),
                ],
                labels: Labels::new(),
            }]
        );
    }
}

/// A key-value pair stored in a tree node.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Entry<K, V> {
    pub key: K,
    pub value: V,
}

impl<K, V> Entry<K, V> {
    pub fn into_pair(self) -> (K, V) {
        let Entry { key, value } = self;
        (key, value)
    }
}

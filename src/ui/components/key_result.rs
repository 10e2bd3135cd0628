/// Result of offering a key event to a component.
///
/// Components get first refusal on keys; `Event` carries anything the
/// parent view needs to act on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyResult<E> {
  /// Key was consumed, nothing for the parent to do
  Handled,
  /// Key was not for this component, pass to the next handler
  NotHandled,
  /// Key produced an event the parent must handle
  Event(E),
}
